//! Storage implementations for user accounts.
//!
//! - **In-memory** - process-local store used by the server binary and tests

pub mod memory;

// Re-exports
pub use memory::InMemoryUserRepository;
