//! Mock provider implementations for testing.
//!
//! The in-memory store covers the happy paths; these mocks cover failures
//! that a real store can produce.

pub mod user;

pub use user::{FailingUserRepository, StaleReadUserRepository};
