//! # Aapkaun Testing
//!
//! Testing utilities for endpoints and the lifecycle engine.
//!
//! This crate provides:
//! - Deterministic time (`FixedClock`, `test_clock`)
//! - A ready-made `TestEnvironment`
//! - Builders for invocation contexts and caller identities
//! - Outcome assertions
//! - proptest strategies for payloads
//!
//! ## Example
//!
//! ```
//! use aapkaun_core::endpoint::{controller_fn, EndpointDefinition};
//! use aapkaun_core::{invoke, ErrorKind, Outcome, Payload, TransportStatus};
//! use aapkaun_testing::{assert_failure, ContextBuilder, TestEnvironment};
//!
//! let secret = EndpointDefinition::new(
//!     "secret",
//!     controller_fn(|_env: &TestEnvironment, _ctx| async {
//!         Outcome::success("ok", Payload::new(), TransportStatus::SuccessRead).into_result()
//!     }),
//! )
//! .secured();
//!
//! let env = TestEnvironment::new();
//! let outcome = tokio_test::block_on(invoke(&secret, &env, ContextBuilder::new().build()));
//! assert_failure(&outcome, ErrorKind::AuthFailure, TransportStatus::AuthFailure);
//! ```

use aapkaun_core::environment::Clock;
use chrono::{DateTime, Utc};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use aapkaun_core::environment::RequestEnvironment;
    use aapkaun_core::guard::DocsReferer;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use aapkaun_testing::mocks::FixedClock;
    /// use aapkaun_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Environment with a fixed clock and no persistence.
    ///
    /// Enough for endpoints whose controllers only look at the context.
    #[derive(Debug, Clone)]
    pub struct TestEnvironment {
        clock: FixedClock,
        docs_referer: Option<DocsReferer>,
    }

    impl Default for TestEnvironment {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestEnvironment {
        /// Environment pinned to [`test_clock`].
        #[must_use]
        pub fn new() -> Self {
            Self::at(test_clock())
        }

        /// Environment pinned to `clock`.
        #[must_use]
        pub const fn at(clock: FixedClock) -> Self {
            Self {
                clock,
                docs_referer: None,
            }
        }

        /// Enable the documentation carve-out.
        #[must_use]
        pub fn with_docs_referer(mut self, docs_referer: DocsReferer) -> Self {
            self.docs_referer = Some(docs_referer);
            self
        }

        /// The pinned time.
        #[must_use]
        pub fn now(&self) -> DateTime<Utc> {
            self.clock.now()
        }
    }

    impl RequestEnvironment for TestEnvironment {
        fn clock(&self) -> &dyn Clock {
            &self.clock
        }

        fn docs_referer(&self) -> Option<&DocsReferer> {
            self.docs_referer.as_ref()
        }
    }
}

/// Builders for contexts and identities.
pub mod helpers {
    use aapkaun_core::{CallerIdentity, Headers, InvocationContext, Payload};
    use chrono::{DateTime, Duration, Utc};
    use serde_json::Value;

    /// Fluent builder for [`InvocationContext`].
    #[derive(Debug, Clone, Default)]
    pub struct ContextBuilder {
        input: Payload,
        headers: Headers,
        caller: Option<CallerIdentity>,
        is_authenticated: bool,
    }

    impl ContextBuilder {
        /// Anonymous caller, empty input.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Replace the input with the fields of `value`.
        ///
        /// Non-object values leave the input empty.
        #[must_use]
        pub fn input(mut self, value: Value) -> Self {
            self.input = match value {
                Value::Object(map) => map,
                _ => Payload::new(),
            };
            self
        }

        /// Add a single input field.
        #[must_use]
        pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
            self.input.insert(key.into(), value.into());
            self
        }

        /// Add a header.
        #[must_use]
        pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
            self.headers.insert(name.into(), value.into());
            self
        }

        /// Attach an authenticated caller.
        #[must_use]
        pub fn caller(mut self, caller: CallerIdentity) -> Self {
            self.caller = Some(caller);
            self.is_authenticated = true;
            self
        }

        /// Override the authentication flag.
        #[must_use]
        pub const fn authenticated(mut self, is_authenticated: bool) -> Self {
            self.is_authenticated = is_authenticated;
            self
        }

        /// Build the context.
        #[must_use]
        pub fn build(self) -> InvocationContext {
            InvocationContext::new(self.input, self.headers, self.caller, self.is_authenticated)
        }
    }

    /// Identity valid for `ttl` after `now`.
    #[must_use]
    pub fn caller_expiring_in(now: DateTime<Utc>, ttl: Duration) -> CallerIdentity {
        CallerIdentity::new("user-1", "Test User", now + ttl)
    }

    /// Identity without an expiry.
    #[must_use]
    pub fn caller_without_expiry() -> CallerIdentity {
        CallerIdentity {
            id: "user-1".to_string(),
            name: "Test User".to_string(),
            expiry: None,
        }
    }
}

/// Outcome assertions.
pub mod assertions {
    use aapkaun_core::{ErrorKind, Outcome, ResultCode, TransportStatus};

    /// Assert a success outcome.
    ///
    /// # Panics
    ///
    /// When the outcome is a failure.
    pub fn assert_success(outcome: &Outcome) {
        assert!(
            outcome.code() == ResultCode::Success,
            "expected success, got {:?}: {:?}",
            outcome.error_kind(),
            outcome.error_description()
        );
    }

    /// Assert a failure with the given kind and status.
    ///
    /// # Panics
    ///
    /// When any of code, kind or status differ.
    pub fn assert_failure(outcome: &Outcome, kind: ErrorKind, status: TransportStatus) {
        assert_eq!(outcome.code(), ResultCode::Failure, "expected failure: {outcome:?}");
        assert_eq!(outcome.error_kind(), Some(kind), "wrong error kind: {outcome:?}");
        assert_eq!(outcome.transport_status(), Some(status), "wrong status: {outcome:?}");
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use aapkaun_core::Payload;
    use proptest::prelude::*;
    use serde_json::Value;

    /// Scalar JSON values as they arrive from query strings and bodies.
    pub fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9@. ]{0,24}".prop_map(Value::String),
        ]
    }

    /// Flat payloads with short lowercase keys.
    pub fn arb_payload() -> impl Strategy<Value = Payload> {
        prop::collection::btree_map("[a-z]{1,8}", arb_scalar(), 0..8)
            .prop_map(|fields| fields.into_iter().collect())
    }

    /// Plausible email addresses.
    pub fn arb_email() -> impl Strategy<Value = String> {
        ("[a-z]{1,10}", "[a-z]{1,10}", "(com|org|io)")
            .prop_map(|(user, domain, tld)| format!("{user}@{domain}.{tld}"))
    }
}

// Re-export commonly used items
pub use assertions::{assert_failure, assert_success};
pub use helpers::{ContextBuilder, caller_expiring_in, caller_without_expiry};
pub use mocks::{FixedClock, TestEnvironment, test_clock};
