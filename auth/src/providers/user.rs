//! User repository trait.

use crate::error::Result;
use crate::model::{UpdateResult, User, UserField, UserId, UserUpdate};
use std::future::Future;

/// User repository.
///
/// This trait abstracts over the document store holding user records.
pub trait UserRepository: Send + Sync {
    /// Find the first user whose `field` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails. A missing user is `Ok(None)`.
    fn find_by_field(
        &self,
        field: UserField,
        value: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send;

    /// All users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    fn find_all(&self) -> impl Future<Output = Result<Vec<User>>> + Send;

    /// Blank, unsaved record with a fresh id.
    fn create_empty(&self) -> User {
        User::empty()
    }

    /// Insert or replace `user`, stamping timestamps.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Store write fails
    /// - Another user already holds one of the emails
    fn save(&self, user: &User) -> impl Future<Output = Result<User>> + Send;

    /// Apply a partial update to the user with `id`.
    ///
    /// # Errors
    ///
    /// Returns error if the store write fails. An unknown id reports zero
    /// matches.
    fn update(
        &self,
        id: UserId,
        update: UserUpdate,
    ) -> impl Future<Output = Result<UpdateResult>> + Send;
}
