//! Configuration management for the server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A `.env` file is read first when present (see `main`).

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound for token lifetime and documentation grace: one year.
pub const MAX_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens
    pub jwt_secret: String,
    /// Token lifetime in seconds (default: ten hours)
    pub token_ttl: u64,
    /// Referer pattern identifying the API documentation page
    pub docs_referer_pattern: String,
    /// Synthetic expiry granted to documentation callers, in seconds
    pub docs_grace: u64,
    /// Password hashing work factor; rounds are `2^work_factor`
    pub password_work_factor: u32,
}

/// Configuration rejected by [`Config::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `AUTH_JWT_SECRET` is empty.
    #[error("AUTH_JWT_SECRET must not be empty")]
    EmptyJwtSecret,

    /// `AUTH_TOKEN_TTL` is zero.
    #[error("AUTH_TOKEN_TTL must be greater than zero")]
    ZeroTokenTtl,

    /// `AUTH_TOKEN_TTL` is longer than [`MAX_LIFETIME_SECS`].
    #[error("AUTH_TOKEN_TTL must be at most {MAX_LIFETIME_SECS} seconds")]
    TokenTtlTooLong,

    /// `AUTH_DOCS_GRACE` is longer than [`MAX_LIFETIME_SECS`].
    #[error("AUTH_DOCS_GRACE must be at most {MAX_LIFETIME_SECS} seconds")]
    DocsGraceTooLong,

    /// `AUTH_DOCS_REFERER_PATTERN` is not a valid regular expression.
    #[error("AUTH_DOCS_REFERER_PATTERN is invalid: {0}")]
    InvalidDocsPattern(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                shutdown_timeout: 30,
            },
            auth: AuthConfig {
                jwt_secret: "change-me".to_string(),
                token_ttl: 36_000,
                docs_referer_pattern: "/docs/api".to_string(),
                docs_grace: 100,
                password_work_factor: 10,
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparseable values fall back to [`Config::default`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = ParsedLookup(&lookup);

        Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or(defaults.server.host),
                port: parsed.get("PORT").unwrap_or(defaults.server.port),
                shutdown_timeout: parsed
                    .get("SHUTDOWN_TIMEOUT")
                    .unwrap_or(defaults.server.shutdown_timeout),
            },
            auth: AuthConfig {
                jwt_secret: lookup("AUTH_JWT_SECRET").unwrap_or(defaults.auth.jwt_secret),
                token_ttl: parsed.get("AUTH_TOKEN_TTL").unwrap_or(defaults.auth.token_ttl),
                docs_referer_pattern: lookup("AUTH_DOCS_REFERER_PATTERN")
                    .unwrap_or(defaults.auth.docs_referer_pattern),
                docs_grace: parsed.get("AUTH_DOCS_GRACE").unwrap_or(defaults.auth.docs_grace),
                password_work_factor: parsed
                    .get("AUTH_PASSWORD_ROUNDS")
                    .unwrap_or(defaults.auth.password_work_factor),
            },
        }
    }

    /// Check the values that would make the server unusable.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::EmptyJwtSecret);
        }
        if self.auth.token_ttl == 0 {
            return Err(ConfigError::ZeroTokenTtl);
        }
        if self.auth.token_ttl > MAX_LIFETIME_SECS {
            return Err(ConfigError::TokenTtlTooLong);
        }
        if self.auth.docs_grace > MAX_LIFETIME_SECS {
            return Err(ConfigError::DocsGraceTooLong);
        }
        regex_check(&self.auth.docs_referer_pattern)?;
        Ok(())
    }

    /// Bind address, `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl AuthConfig {
    /// Token lifetime.
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        seconds(self.token_ttl)
    }

    /// Documentation grace period.
    #[must_use]
    pub fn docs_grace(&self) -> Duration {
        seconds(self.docs_grace)
    }
}

struct ParsedLookup<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> ParsedLookup<'_, F> {
    fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        (self.0)(key).and_then(|value| value.trim().parse().ok())
    }
}

/// Whole seconds, saturating at the largest representable duration.
fn seconds(value: u64) -> Duration {
    const MAX_SECONDS: i64 = i64::MAX / 1_000;
    Duration::seconds(i64::try_from(value).map_or(MAX_SECONDS, |s| s.min(MAX_SECONDS)))
}

fn regex_check(pattern: &str) -> Result<(), ConfigError> {
    aapkaun_core::guard::DocsReferer::new(pattern, Duration::zero())
        .map(|_| ())
        .map_err(|err| ConfigError::InvalidDocsPattern(err.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));

        assert_eq!(config.address(), "0.0.0.0:8000");
        assert_eq!(config.auth.token_ttl(), Duration::hours(10));
        assert_eq!(config.auth.docs_grace(), Duration::seconds(100));
        assert_eq!(config.auth.password_work_factor, 10);
        assert_eq!(config.server.shutdown_timeout, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("AUTH_TOKEN_TTL", "60"),
            ("AUTH_PASSWORD_ROUNDS", "not-a-number"),
        ]));

        assert_eq!(config.address(), "127.0.0.1:9000");
        assert_eq!(config.auth.token_ttl(), Duration::minutes(1));
        assert_eq!(config.auth.password_work_factor, 10);
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let empty_secret = Config::from_lookup(lookup(&[("AUTH_JWT_SECRET", " ")]));
        assert_eq!(empty_secret.validate(), Err(ConfigError::EmptyJwtSecret));

        let zero_ttl = Config::from_lookup(lookup(&[("AUTH_TOKEN_TTL", "0")]));
        assert_eq!(zero_ttl.validate(), Err(ConfigError::ZeroTokenTtl));

        let long_ttl = Config::from_lookup(lookup(&[("AUTH_TOKEN_TTL", "18446744073709551615")]));
        assert_eq!(long_ttl.validate(), Err(ConfigError::TokenTtlTooLong));

        let long_grace = Config::from_lookup(lookup(&[("AUTH_DOCS_GRACE", "9223372036854775807")]));
        assert_eq!(long_grace.validate(), Err(ConfigError::DocsGraceTooLong));

        let bad_pattern = Config::from_lookup(lookup(&[("AUTH_DOCS_REFERER_PATTERN", "(")]));
        assert!(matches!(
            bad_pattern.validate(),
            Err(ConfigError::InvalidDocsPattern(_))
        ));
    }
}
