//! Account providers.
//!
//! Traits for the external capabilities the account endpoints depend on,
//! plus the production token and password implementations. Endpoints only
//! see the traits; the environment decides which implementation runs.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐
//! │ Endpoint     │────▶│ UserRepository   │  stores::InMemoryUserRepository
//! │ controllers  │     ├──────────────────┤
//! │              │────▶│ TokenIssuer      │  JwtTokenIssuer
//! │              │     ├──────────────────┤
//! │              │────▶│ PasswordHasher   │  Sha256PasswordHasher
//! └──────────────┘     └──────────────────┘
//! ```

pub mod jwt;
pub mod password;
pub mod sha256_password;
pub mod token;
pub mod user;

// Re-export provider traits
pub use jwt::JwtTokenIssuer;
pub use password::PasswordHasher;
pub use sha256_password::Sha256PasswordHasher;
pub use token::{TokenClaims, TokenIssuer};
pub use user::UserRepository;
