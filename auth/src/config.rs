//! Authentication configuration.
//!
//! Values are provided by the application (see the server's `Config`), not
//! hardcoded; the defaults here match the server defaults.

use chrono::Duration;

/// Bearer token configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HS256 signing secret.
    pub secret: String,

    /// Lifetime of issued tokens.
    ///
    /// Default: 10 hours
    pub ttl: Duration,
}

impl TokenConfig {
    /// Create new token configuration.
    ///
    /// # Arguments
    ///
    /// * `secret` - HS256 signing secret shared by issuer and resolver
    #[must_use]
    pub const fn new(secret: String) -> Self {
        Self {
            secret,
            ttl: Duration::hours(10),
        }
    }

    /// Set token lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new("change-me".to_string())
    }
}

/// Password hashing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    /// Cost exponent; each hash runs `2^work_factor` digest rounds.
    ///
    /// Default: 10
    pub work_factor: u32,
}

impl PasswordConfig {
    /// Largest accepted work factor.
    pub const MAX_WORK_FACTOR: u32 = 20;

    /// Create new password configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self { work_factor: 10 }
    }

    /// Set the work factor, clamped to [`PasswordConfig::MAX_WORK_FACTOR`].
    #[must_use]
    pub const fn with_work_factor(mut self, work_factor: u32) -> Self {
        self.work_factor = if work_factor > Self::MAX_WORK_FACTOR {
            Self::MAX_WORK_FACTOR
        } else {
            work_factor
        };
        self
    }

    /// Digest rounds per hash.
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        1 << self.work_factor
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self::new()
    }
}
