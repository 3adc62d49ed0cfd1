//! Authentication environment.
//!
//! This module defines the environment type handed to the account
//! endpoints and to the lifecycle engine.

use crate::config::TokenConfig;
use crate::providers::{PasswordHasher, TokenIssuer, UserRepository};
use crate::service::UserService;
use aapkaun_core::environment::{Clock, RequestEnvironment};
use aapkaun_core::guard::DocsReferer;
use chrono::Duration;
use std::sync::Arc;

/// Authentication environment.
///
/// Contains all external dependencies needed by the account endpoints.
///
/// # Type Parameters
///
/// - `U`: User repository
/// - `T`: Token issuer
/// - `P`: Password hasher
#[derive(Clone)]
pub struct AuthEnvironment<U, T, P>
where
    U: UserRepository,
    T: TokenIssuer,
    P: PasswordHasher,
{
    /// User repository.
    pub users: U,

    /// Token issuer and resolver.
    pub tokens: Arc<T>,

    /// Password hasher.
    pub passwords: P,

    /// Time source for expiry decisions.
    pub clock: Arc<dyn Clock>,

    /// Lifetime of issued tokens.
    pub token_ttl: Duration,

    /// Documentation-caller carve-out.
    pub docs_referer: Option<DocsReferer>,
}

impl<U, T, P> AuthEnvironment<U, T, P>
where
    U: UserRepository,
    T: TokenIssuer,
    P: PasswordHasher,
{
    /// Create a new authentication environment.
    #[must_use]
    pub fn new(users: U, tokens: Arc<T>, passwords: P, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            tokens,
            passwords,
            clock,
            token_ttl: TokenConfig::default().ttl,
            docs_referer: None,
        }
    }

    /// Set token lifetime.
    #[must_use]
    pub const fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Enable the documentation carve-out.
    #[must_use]
    pub fn with_docs_referer(mut self, docs_referer: DocsReferer) -> Self {
        self.docs_referer = Some(docs_referer);
        self
    }

    /// User service over the repository.
    #[must_use]
    pub const fn user_service(&self) -> UserService<'_, U> {
        UserService::new(&self.users)
    }
}

impl<U, T, P> RequestEnvironment for AuthEnvironment<U, T, P>
where
    U: UserRepository + 'static,
    T: TokenIssuer + 'static,
    P: PasswordHasher + 'static,
{
    fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn docs_referer(&self) -> Option<&DocsReferer> {
        self.docs_referer.as_ref()
    }
}
