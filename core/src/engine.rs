//! Request lifecycle engine.
//!
//! One [`Lifecycle`] drives one invocation through
//! `Created → Authorizing → Validating → Executing → Responded`. Every stage
//! failure becomes a terminal [`Outcome`]; the executing stage is the only
//! place controller errors and panics are caught.

use crate::context::InvocationContext;
use crate::endpoint::{ControllerOutput, EndpointDefinition};
use crate::envelope::Outcome;
use crate::environment::RequestEnvironment;
use crate::error::{ErrorKind, TransportStatus};
use crate::guard::authorize;
use crate::validation::validate;
use futures::FutureExt;
use futures::future;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use tracing::{Instrument, debug, error, info_span, warn};

/// Stage of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Context built, nothing evaluated.
    Created,
    /// Running the authorization guard.
    Authorizing,
    /// Running input validation.
    Validating,
    /// Running the controller.
    Executing,
    /// Terminal; the outcome is fixed.
    Responded,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Authorizing => "authorizing",
            Self::Validating => "validating",
            Self::Executing => "executing",
            Self::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// Result of a finished lifecycle.
#[derive(Debug, Clone)]
pub struct Completion {
    outcome: Outcome,
    context: InvocationContext,
    trail: Vec<LifecycleState>,
}

impl Completion {
    /// The single outcome of the invocation.
    #[must_use]
    pub const fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Context as left by the engine (validated data, errors).
    #[must_use]
    pub const fn context(&self) -> &InvocationContext {
        &self.context
    }

    /// States visited, in order.
    #[must_use]
    pub fn trail(&self) -> &[LifecycleState] {
        &self.trail
    }

    /// Take the outcome.
    #[must_use]
    pub fn into_outcome(self) -> Outcome {
        self.outcome
    }
}

/// Single-use driver for one invocation.
///
/// `run` consumes the lifecycle, so a responded instance cannot be run
/// again.
pub struct Lifecycle<'e, E> {
    endpoint: &'e EndpointDefinition<E>,
    env: &'e E,
    context: InvocationContext,
    state: LifecycleState,
    trail: Vec<LifecycleState>,
}

impl<'e, E: RequestEnvironment> Lifecycle<'e, E> {
    /// Fresh lifecycle in [`LifecycleState::Created`].
    #[must_use]
    pub fn new(endpoint: &'e EndpointDefinition<E>, env: &'e E, context: InvocationContext) -> Self {
        Self {
            endpoint,
            env,
            context,
            state: LifecycleState::Created,
            trail: vec![LifecycleState::Created],
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Drive the invocation to [`LifecycleState::Responded`].
    pub async fn run(mut self) -> Completion {
        let span = info_span!(
            "lifecycle",
            endpoint = %self.endpoint.name(),
            correlation_id = %self.context.correlation_id(),
        );

        async move {
            let outcome = self.drive().await;
            self.advance(LifecycleState::Responded);
            debug!(
                code = outcome.code().as_u8(),
                status = ?outcome.transport_status(),
                "invocation responded"
            );
            Completion {
                outcome,
                context: self.context,
                trail: self.trail,
            }
        }
        .instrument(span)
        .await
    }

    fn advance(&mut self, next: LifecycleState) {
        debug!(from = %self.state, to = %next, "lifecycle transition");
        self.state = next;
        self.trail.push(next);
    }

    async fn drive(&mut self) -> Outcome {
        self.advance(LifecycleState::Authorizing);
        if !self.guard() {
            warn!("caller not authorized");
            return Outcome::failure(
                "Unauthorised",
                "Invalid or missing auth token",
                ErrorKind::AuthFailure,
                TransportStatus::AuthFailure,
            );
        }

        self.advance(LifecycleState::Validating);
        if let Some(schema) = self.endpoint.schema() {
            debug!(schema = %schema.describe(), "validating input");
        }
        match validate(self.endpoint.schema(), self.context.raw_input()) {
            Ok(data) => self.context.accept(data),
            Err(errors) => {
                let joined = errors.join(", ");
                debug!(errors = %joined, "validation failed");
                self.context.reject(errors);
                return Outcome::failure(
                    "Bad Request",
                    joined,
                    ErrorKind::ValidationFailed,
                    TransportStatus::BadRequest,
                );
            }
        }

        self.advance(LifecycleState::Executing);
        self.execute().await
    }

    fn guard(&self) -> bool {
        let now = self.env.clock().now();
        let caller = self.context.caller();
        let effective = match self.env.docs_referer() {
            Some(docs) => docs.effective_identity(self.context.headers(), caller, now),
            None => caller.cloned(),
        };
        authorize(
            self.endpoint.requires_auth(),
            effective.as_ref(),
            self.context.is_authenticated(),
            now,
        )
    }

    async fn execute(&self) -> Outcome {
        // Controllers may panic before handing back their future.
        let call = future::lazy(|_| self.endpoint.controller().call(self.env, &self.context))
            .flatten();

        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(ControllerOutput::Outcome(outcome))) => outcome,
            Ok(Ok(ControllerOutput::Untyped(value))) => {
                error!(returned = %value, "controller returned a value that is not an outcome");
                server_error("controller must return an Outcome")
            }
            Ok(Err(err)) => {
                error!(error = ?err, "controller failed");
                server_error(err.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(panic = %message, "controller panicked");
                server_error(message)
            }
        }
    }
}

/// Run `endpoint` once for `context`.
pub async fn invoke<E: RequestEnvironment>(
    endpoint: &EndpointDefinition<E>,
    env: &E,
    context: InvocationContext,
) -> Outcome {
    Lifecycle::new(endpoint, env, context)
        .run()
        .await
        .into_outcome()
}

fn server_error(message: impl Into<String>) -> Outcome {
    Outcome::failure(
        "Server Error",
        message,
        ErrorKind::ServerError,
        TransportStatus::ServerError,
    )
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "controller panicked".to_string()
    }
}
