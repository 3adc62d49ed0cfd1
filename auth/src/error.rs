//! Error types for account, password and token operations.

use aapkaun_core::ControllerError;
use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of the account capabilities.
///
/// Endpoints turn the user-facing variants into failure outcomes; the rest
/// surface as server errors through [`ControllerError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Unknown email or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bearer token failed signature or shape checks.
    #[error("Invalid token: {reason}")]
    InvalidToken {
        /// Reason reported by the decoder
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Account Errors
    // ═══════════════════════════════════════════════════════════

    /// An account with this email already exists.
    #[error("User Already Exists")]
    UserAlreadyExists,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Persistence operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Token signing failed.
    #[error("Token signing failed: {0}")]
    SigningFailed(String),

    /// Stored password hash is malformed.
    #[error("Malformed password hash")]
    MalformedHash,

    /// Internal server error (should not be exposed to users).
    #[error("Internal error")]
    InternalError,
}

impl AuthError {
    /// Returns `true` if this error is due to caller input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use aapkaun_auth::AuthError;
    /// assert!(AuthError::InvalidCredentials.is_user_error());
    /// assert!(!AuthError::InternalError.is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::InvalidToken { .. }
                | Self::UserAlreadyExists
        )
    }
}

impl From<AuthError> for ControllerError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::DatabaseError(message) => Self::Unavailable {
                service: "persistence",
                message,
            },
            AuthError::SigningFailed(message) => Self::Unavailable {
                service: "token signing",
                message,
            },
            other => Self::message(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_becomes_unavailable() {
        let err = ControllerError::from(AuthError::DatabaseError("timeout".to_string()));
        assert_eq!(err.to_string(), "persistence unavailable: timeout");
    }

    #[test]
    fn test_duplicate_account_is_user_error() {
        assert!(AuthError::UserAlreadyExists.is_user_error());
        assert_eq!(
            ControllerError::from(AuthError::UserAlreadyExists).to_string(),
            "User Already Exists"
        );
    }

    #[test]
    fn test_other_errors_keep_their_message() {
        let err = ControllerError::from(AuthError::MalformedHash);
        assert_eq!(err.to_string(), "Malformed password hash");
    }
}
