//! HS256 JSON Web Token issuer.

use super::token::{TokenClaims, TokenIssuer};
use crate::config::TokenConfig;
use crate::error::{AuthError, Result};
use aapkaun_core::{CallerIdentity, IdentityResolver};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize)]
struct SignedClaims {
    #[serde(flatten)]
    claims: TokenClaims,
    exp: i64,
}

/// JWT issuer and resolver sharing one HS256 secret.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtTokenIssuer {
    /// Build from the token configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    /// Verify the signature and return the embedded claims.
    ///
    /// `exp` is checked for presence only; the lifecycle guard compares the
    /// millisecond `expiry` against the environment clock.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] for a bad signature or shape.
    pub fn decode(&self, token: &str) -> Result<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<SignedClaims>(token, &self.decoding, &validation)
            .map_err(|e| AuthError::InvalidToken {
                reason: e.to_string(),
            })?;

        Ok(data.claims.claims)
    }
}

impl fmt::Debug for JwtTokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, claims: &TokenClaims) -> Result<String> {
        let signed = SignedClaims {
            claims: claims.clone(),
            exp: claims.expiry.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &signed, &self.encoding)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))
    }
}

impl IdentityResolver for JwtTokenIssuer {
    fn resolve(&self, token: &str) -> Option<CallerIdentity> {
        match self.decode(token) {
            Ok(claims) => Some(claims.into_identity()),
            Err(error) => {
                tracing::debug!(%error, "rejecting bearer token");
                None
            }
        }
    }
}
