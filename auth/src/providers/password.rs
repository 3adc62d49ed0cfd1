//! Password hasher trait.

use crate::error::Result;

/// Password capability.
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns error if the hasher cannot produce a digest.
    fn hash(&self, password: &str) -> Result<String>;

    /// Check `password` against a stored `hash`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::MalformedHash`] if `hash` was not produced
    /// by this hasher.
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}
