//! User service.
//!
//! Thin query/command layer over a [`UserRepository`] used by the endpoints.

use crate::error::Result;
use crate::model::{UpdateResult, User, UserField, UserId, UserUpdate};
use crate::providers::UserRepository;

/// Account operations over a borrowed repository.
#[derive(Debug)]
pub struct UserService<'a, U> {
    users: &'a U,
}

impl<'a, U: UserRepository> UserService<'a, U> {
    /// Wrap a repository.
    #[must_use]
    pub const fn new(users: &'a U) -> Self {
        Self { users }
    }

    /// User holding `email` among their addresses.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users.find_by_field(UserField::Email, email).await
    }

    /// User with the given id.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.users.find_by_field(UserField::Id, id).await
    }

    /// Every user.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.users.find_all().await
    }

    /// Blank, unsaved user.
    #[must_use]
    pub fn create_user(&self) -> User {
        self.users.create_empty()
    }

    /// Persist `user`.
    ///
    /// # Errors
    ///
    /// Returns error if the store write fails.
    pub async fn save_user(&self, user: &User) -> Result<User> {
        self.users.save(user).await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns error if the store write fails.
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<UpdateResult> {
        self.users.update(id, update).await
    }
}

impl<U> Clone for UserService<'_, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for UserService<'_, U> {}
