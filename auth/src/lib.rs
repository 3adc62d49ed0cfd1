//! # Aapkaun Authentication
//!
//! User accounts and the capabilities behind them, exposed as endpoints for
//! the lifecycle engine in `aapkaun-core`.
//!
//! ## Features
//!
//! - **Accounts**: user model, repository trait, in-memory store, service
//! - **Passwords**: salted, iterated SHA-256 with constant-time comparison
//! - **Tokens**: HS256 JWTs that also resolve back into caller identities
//! - **Endpoints**: sign-up, sign-in, session, user list and lookup
//!
//! ## Architecture
//!
//! Endpoints are plain definitions over an [`AuthEnvironment`]:
//!
//! ```text
//! Transport → Lifecycle (guard, validate) → Controller → Outcome
//!                                              │
//!                                              ▼
//!                          AuthEnvironment { users, tokens, passwords, clock }
//! ```
//!
//! ## Example: sign-up
//!
//! ```
//! use aapkaun_auth::config::{PasswordConfig, TokenConfig};
//! use aapkaun_auth::endpoints;
//! use aapkaun_auth::providers::{JwtTokenIssuer, Sha256PasswordHasher};
//! use aapkaun_auth::stores::InMemoryUserRepository;
//! use aapkaun_auth::AuthEnvironment;
//! use aapkaun_core::{invoke, Headers, InvocationContext, ResultCode, SystemClock};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let env = AuthEnvironment::new(
//!     InMemoryUserRepository::new(),
//!     Arc::new(JwtTokenIssuer::new(&TokenConfig::new("secret".to_string()))),
//!     Sha256PasswordHasher::new(PasswordConfig::new().with_work_factor(4)),
//!     Arc::new(SystemClock),
//! );
//! let sign_up = endpoints::sign_up::definition();
//!
//! let input = json!({
//!     "email": "ada@example.com",
//!     "password": "secret1",
//!     "firstName": "Ada",
//!     "lastName": "Lovelace",
//!     "company": "Analytical Engines",
//! });
//! let ctx = InvocationContext::new(
//!     input.as_object().cloned().unwrap_or_default(),
//!     Headers::new(),
//!     None,
//!     false,
//! );
//!
//! let outcome = tokio_test::block_on(invoke(&sign_up, &env, ctx));
//! assert_eq!(outcome.code(), ResultCode::Success);
//! assert_eq!(outcome.payload()["token_type"], "bearer");
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod endpoints;
pub mod environment;
pub mod error;
pub mod model;
pub mod providers;
pub mod service;
pub mod stores;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use environment::AuthEnvironment;
pub use error::{AuthError, Result};
pub use model::{User, UserId};
pub use service::UserService;
