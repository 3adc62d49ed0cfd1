//! Mock user repository for testing.

use crate::error::{AuthError, Result};
use crate::model::{UpdateResult, User, UserField, UserId, UserUpdate};
use crate::providers::UserRepository;
use std::future::Future;

/// User repository whose every call fails with a database error.
#[derive(Debug, Clone)]
pub struct FailingUserRepository {
    message: String,
}

impl FailingUserRepository {
    /// Create a repository failing with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn fail<T>(&self) -> impl Future<Output = Result<T>> + Send + use<T> {
        let message = self.message.clone();
        async move { Err(AuthError::DatabaseError(message)) }
    }
}

impl Default for FailingUserRepository {
    fn default() -> Self {
        Self::new("connection refused")
    }
}

/// Wraps a repository so that lookups never find anyone.
///
/// Models a writer that checked for an existing account before another
/// writer committed the same email.
#[derive(Debug, Clone)]
pub struct StaleReadUserRepository<U> {
    inner: U,
}

impl<U> StaleReadUserRepository<U> {
    /// Wrap `inner`.
    #[must_use]
    pub const fn new(inner: U) -> Self {
        Self { inner }
    }

    /// The wrapped repository.
    #[must_use]
    pub const fn inner(&self) -> &U {
        &self.inner
    }
}

impl<U: UserRepository> UserRepository for StaleReadUserRepository<U> {
    fn find_by_field(
        &self,
        _field: UserField,
        _value: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send {
        async { Ok(None) }
    }

    fn find_all(&self) -> impl Future<Output = Result<Vec<User>>> + Send {
        self.inner.find_all()
    }

    fn save(&self, user: &User) -> impl Future<Output = Result<User>> + Send {
        self.inner.save(user)
    }

    fn update(
        &self,
        id: UserId,
        update: UserUpdate,
    ) -> impl Future<Output = Result<UpdateResult>> + Send {
        self.inner.update(id, update)
    }
}

impl UserRepository for FailingUserRepository {
    fn find_by_field(
        &self,
        _field: UserField,
        _value: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send {
        self.fail()
    }

    fn find_all(&self) -> impl Future<Output = Result<Vec<User>>> + Send {
        self.fail()
    }

    fn save(&self, _user: &User) -> impl Future<Output = Result<User>> + Send {
        self.fail()
    }

    fn update(
        &self,
        _id: UserId,
        _update: UserUpdate,
    ) -> impl Future<Output = Result<UpdateResult>> + Send {
        self.fail()
    }
}
