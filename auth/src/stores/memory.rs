//! In-memory user store.
//!
//! Backs the server binary and the tests. Records live in insertion order
//! behind a mutex; nothing survives a restart.

use crate::error::{AuthError, Result};
use crate::model::{UpdateResult, User, UserField, UserId, UserUpdate};
use crate::providers::UserRepository;
use aapkaun_core::environment::{Clock, SystemClock};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// In-memory [`UserRepository`].
#[derive(Clone)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<Vec<User>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserRepository {
    /// Create an empty store on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store stamping records with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
            clock,
        }
    }

    /// Number of stored users.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InternalError`] if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.users.lock().map_err(|_| AuthError::InternalError)?.len())
    }

    /// `true` when no user is stored.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InternalError`] if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryUserRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryUserRepository")
            .field("users", &self.users)
            .finish_non_exhaustive()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_field(
        &self,
        field: UserField,
        value: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send {
        let users = Arc::clone(&self.users);
        let value = value.to_string();

        async move {
            Ok(users
                .lock()
                .map_err(|_| AuthError::InternalError)?
                .iter()
                .find(|user| field.matches(user, &value))
                .cloned())
        }
    }

    fn find_all(&self) -> impl Future<Output = Result<Vec<User>>> + Send {
        let users = Arc::clone(&self.users);

        async move { Ok(users.lock().map_err(|_| AuthError::InternalError)?.clone()) }
    }

    fn save(&self, user: &User) -> impl Future<Output = Result<User>> + Send {
        let users = Arc::clone(&self.users);
        let mut user = user.clone();
        let now = self.clock.now();

        async move {
            let mut guard = users.lock().map_err(|_| AuthError::InternalError)?;

            // Check if an email is already taken by someone else
            let taken = guard.iter().any(|other| {
                other.id != user.id
                    && user
                        .emails
                        .iter()
                        .any(|address| other.has_email(&address.email))
            });
            if taken {
                return Err(AuthError::UserAlreadyExists);
            }

            user.created_at.get_or_insert(now);
            user.updated_at = Some(now);

            match guard.iter_mut().find(|other| other.id == user.id) {
                Some(existing) => *existing = user.clone(),
                None => guard.push(user.clone()),
            }
            Ok(user)
        }
    }

    fn update(
        &self,
        id: UserId,
        update: UserUpdate,
    ) -> impl Future<Output = Result<UpdateResult>> + Send {
        let users = Arc::clone(&self.users);
        let now = self.clock.now();

        async move {
            let mut guard = users.lock().map_err(|_| AuthError::InternalError)?;

            let Some(user) = guard.iter_mut().find(|user| user.id == id) else {
                return Ok(UpdateResult::default());
            };
            if update.is_empty() {
                return Ok(UpdateResult {
                    matched: 1,
                    modified: 0,
                });
            }

            update.apply(user, now);
            Ok(UpdateResult {
                matched: 1,
                modified: 1,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{EmailAddress, PersonName};
    use aapkaun_testing::test_clock;

    fn store() -> InMemoryUserRepository {
        InMemoryUserRepository::with_clock(Arc::new(test_clock()))
    }

    fn user(email: &str) -> User {
        let mut user = User::empty();
        user.name = PersonName::new("Ada", "Lovelace");
        user.emails.push(EmailAddress::primary(email));
        user
    }

    #[tokio::test]
    async fn test_save_then_find_by_email_and_id() {
        let store = store();
        let saved = store.save(&user("ada@example.com")).await.unwrap();

        assert_eq!(saved.created_at, Some(test_clock().now()));
        let by_email = store
            .find_by_field(UserField::Email, "ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, saved.id);

        let by_id = store
            .find_by_field(UserField::Id, &saved.id.to_string())
            .await
            .unwrap();
        assert_eq!(by_id, Some(saved));
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let found = store()
            .find_by_field(UserField::Email, "nobody@example.com")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = store();
        store.save(&user("ada@example.com")).await.unwrap();

        let err = store.save(&user("ada@example.com")).await.unwrap_err();
        assert_eq!(err, AuthError::UserAlreadyExists);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_replaces_same_id() {
        let store = store();
        let mut saved = store.save(&user("ada@example.com")).await.unwrap();
        saved.name = PersonName::new("Augusta", "King");

        store.save(&saved).await.unwrap();
        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name.full(), "Augusta King");
    }

    #[tokio::test]
    async fn test_update_reports_counts() {
        let store = store();
        let saved = store.save(&user("ada@example.com")).await.unwrap();

        let update = UserUpdate {
            password: Some("new-hash".to_string()),
            ..UserUpdate::default()
        };
        let result = store.update(saved.id, update.clone()).await.unwrap();
        assert_eq!(result, UpdateResult { matched: 1, modified: 1 });

        let missing = store.update(UserId::new(), update).await.unwrap();
        assert_eq!(missing, UpdateResult::default());

        let noop = store.update(saved.id, UserUpdate::default()).await.unwrap();
        assert_eq!(noop, UpdateResult { matched: 1, modified: 0 });
    }
}
