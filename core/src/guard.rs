//! Authorization guard.

use crate::context::Headers;
use crate::identity::CallerIdentity;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;

/// Decide whether an invocation may proceed.
///
/// Unsecured endpoints always pass. Secured endpoints need an identity that
/// is flagged authenticated and whose expiry is not before `now`; a missing
/// expiry counts as expired.
///
/// # Examples
///
/// ```
/// use aapkaun_core::{authorize, CallerIdentity};
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// let caller = CallerIdentity::new("u-1", "Ada", now + Duration::minutes(5));
///
/// assert!(authorize(false, None, false, now));
/// assert!(authorize(true, Some(&caller), true, now));
/// assert!(!authorize(true, Some(&caller), false, now));
/// assert!(!authorize(true, None, true, now));
/// ```
#[must_use]
pub fn authorize(
    requires_auth: bool,
    identity: Option<&CallerIdentity>,
    is_authenticated: bool,
    now: DateTime<Utc>,
) -> bool {
    if !requires_auth {
        return true;
    }
    match identity {
        Some(identity) => is_authenticated && identity.is_live_at(now),
        None => false,
    }
}

/// Carve-out for the interactive API documentation.
///
/// Requests whose `referer` header matches `pattern` and whose identity has
/// no expiry get a synthetic expiry of `now + grace`. Nothing else about the
/// identity changes, and anonymous callers stay anonymous.
#[derive(Debug, Clone)]
pub struct DocsReferer {
    pattern: Regex,
    grace: Duration,
}

impl DocsReferer {
    /// Build the carve-out from a referer regex and a grace period.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn new(pattern: &str, grace: Duration) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            grace,
        })
    }

    /// Grace period granted to documentation callers.
    #[must_use]
    pub const fn grace(&self) -> Duration {
        self.grace
    }

    /// Whether the request came from the documentation page.
    #[must_use]
    pub fn matches(&self, headers: &Headers) -> bool {
        headers
            .get("referer")
            .is_some_and(|referer| self.pattern.is_match(referer))
    }

    /// Identity to authorize with: the caller's own, or a copy carrying the
    /// synthetic expiry when the carve-out applies.
    #[must_use]
    pub fn effective_identity(
        &self,
        headers: &Headers,
        identity: Option<&CallerIdentity>,
        now: DateTime<Utc>,
    ) -> Option<CallerIdentity> {
        let identity = identity?;
        if identity.expiry.is_none() && self.matches(headers) {
            // An unrepresentable expiry grants nothing.
            let Some(expiry) = now.checked_add_signed(self.grace) else {
                tracing::warn!(caller = %identity.id, "documentation grace overflows; not granted");
                return Some(identity.clone());
            };
            tracing::debug!(caller = %identity.id, "granting documentation grace expiry");
            let mut granted = identity.clone();
            granted.expiry = Some(expiry);
            return Some(granted);
        }
        Some(identity.clone())
    }
}
