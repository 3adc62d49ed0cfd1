//! Dependency injection seams.
//!
//! All process-wide collaborators reach the engine and the controllers
//! through an environment value constructed once at startup and passed by
//! reference into every invocation.

use crate::guard::DocsReferer;
use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability.
///
/// # Examples
///
/// ```ignore
/// // Production - uses system clock
/// let clock = SystemClock;
///
/// // Test - fixed time for deterministic tests
/// let clock = FixedClock::new(time);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// What the lifecycle engine needs from an environment.
///
/// Controllers see the concrete environment type and may use anything else
/// it carries (persistence, token capability, ...).
pub trait RequestEnvironment: Send + Sync + 'static {
    /// Time source used by the authorization guard.
    fn clock(&self) -> &dyn Clock;

    /// Documentation-caller carve-out, if enabled.
    fn docs_referer(&self) -> Option<&DocsReferer> {
        None
    }
}
