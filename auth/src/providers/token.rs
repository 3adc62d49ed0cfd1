//! Token issuer trait.

use crate::error::Result;
use aapkaun_core::{CallerIdentity, IdentityResolver};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub id: String,
    /// Display name at issuance.
    pub name: String,
    /// Absolute expiry, epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expiry: DateTime<Utc>,
}

impl TokenClaims {
    /// Build claims.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expiry,
        }
    }

    /// Identity the claims stand for.
    #[must_use]
    pub fn into_identity(self) -> CallerIdentity {
        CallerIdentity::new(self.id, self.name, self.expiry)
    }
}

/// Token capability.
///
/// Issues signed tokens for controllers and, as an [`IdentityResolver`],
/// turns presented tokens back into identities for transports.
pub trait TokenIssuer: IdentityResolver {
    /// Sign `claims` into an opaque token string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::SigningFailed`] if signing fails.
    fn issue(&self, claims: &TokenClaims) -> Result<String>;
}
