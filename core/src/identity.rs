//! Caller identity as supplied by the transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity record attached to an invocation.
///
/// The engine never creates one; transports resolve it from a bearer token
/// (or receive it pre-resolved in an event) and hand it over with the
/// `is_authenticated` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Stable user identifier.
    #[serde(alias = "_id")]
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Absolute expiry fixed at token issuance, epoch milliseconds on the wire.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expiry: Option<DateTime<Utc>>,
}

impl CallerIdentity {
    /// Identity with an expiry.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expiry: Some(expiry),
        }
    }

    /// `true` when the expiry is known and not before `now`.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry >= now)
    }
}

/// Resolves a bearer credential into an identity.
///
/// Implemented by the token capability; consumed by transports. Returning
/// `None` leaves the caller anonymous and lets the guard decide.
pub trait IdentityResolver: Send + Sync {
    /// Resolve `token` (without the `Bearer ` prefix).
    fn resolve(&self, token: &str) -> Option<CallerIdentity>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    #[test]
    fn test_expiry_round_trips_as_millis() {
        let expiry = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let identity = CallerIdentity::new("u-1", "Ada Lovelace", expiry);

        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(value["expiry"], json!(1_700_000_000_123_i64));
    }

    #[test]
    fn test_accepts_underscore_id_and_missing_expiry() {
        let identity: CallerIdentity =
            serde_json::from_value(json!({ "_id": "abc", "name": "Ada" })).unwrap();
        assert_eq!(identity.id, "abc");
        assert_eq!(identity.expiry, None);
    }

    #[test]
    fn test_is_live_at_boundary() {
        let now = Utc::now();
        let identity = CallerIdentity::new("u-1", "Ada", now);
        assert!(identity.is_live_at(now));
        assert!(!identity.is_live_at(now + Duration::milliseconds(1)));
    }
}
