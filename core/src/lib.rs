//! # Aapkaun Core
//!
//! The request lifecycle engine and its vocabulary.
//!
//! Every API operation is an [`EndpointDefinition`]: an auth flag, an
//! optional input [`Schema`] and a [`Controller`]. The engine drives one
//! invocation through a fixed pipeline and always answers with exactly one
//! [`Outcome`]:
//!
//! ```text
//! Created → Authorizing → Validating → Executing → Responded
//!              │ 403          │ 400        │ 500 on error/panic
//!              └──────────────┴────────────┴──────────→ Responded
//! ```
//!
//! Transports (event-style and HTTP) live in `aapkaun-web`; persistence and
//! tokens live in `aapkaun-auth`. Both reach the engine through an
//! environment value implementing [`RequestEnvironment`].
//!
//! ## Example
//!
//! ```
//! use aapkaun_core::endpoint::{controller_fn, EndpointDefinition};
//! use aapkaun_core::environment::{Clock, RequestEnvironment, SystemClock};
//! use aapkaun_core::{invoke, Headers, InvocationContext, Outcome, Payload, ResultCode, TransportStatus};
//!
//! struct Env(SystemClock);
//!
//! impl RequestEnvironment for Env {
//!     fn clock(&self) -> &dyn Clock {
//!         &self.0
//!     }
//! }
//!
//! let hello = EndpointDefinition::new(
//!     "hello",
//!     controller_fn(|_env: &Env, _ctx| async {
//!         Outcome::success("Hello", Payload::new(), TransportStatus::SuccessRead).into_result()
//!     }),
//! );
//!
//! let ctx = InvocationContext::new(Payload::new(), Headers::new(), None, false);
//! let outcome = tokio_test::block_on(invoke(&hello, &Env(SystemClock), ctx));
//! assert_eq!(outcome.code(), ResultCode::Success);
//! ```

pub mod context;
pub mod endpoint;
pub mod engine;
pub mod envelope;
pub mod environment;
pub mod error;
pub mod guard;
pub mod identity;
pub mod validation;

pub use context::{Headers, InvocationContext, merge_input};
pub use endpoint::{
    Controller, ControllerOutput, ControllerResult, EndpointDefinition, EndpointRegistry,
    RegistryError, controller_fn,
};
pub use engine::{Completion, Lifecycle, LifecycleState, invoke};
pub use envelope::{Outcome, Payload, ResultCode, WireEnvelope};
pub use environment::{Clock, RequestEnvironment, SystemClock};
pub use error::{ControllerError, ErrorKind, TransportStatus, UnknownStatus};
pub use guard::{DocsReferer, authorize};
pub use identity::{CallerIdentity, IdentityResolver};
pub use validation::{FieldRule, FieldType, Schema};
