//! Session endpoint: describe the authenticated caller.

use super::{AuthEndpoint, names};
use crate::environment::AuthEnvironment;
use crate::providers::{PasswordHasher, TokenIssuer, UserRepository};
use aapkaun_core::{
    Controller, ControllerError, ControllerResult, EndpointDefinition, InvocationContext, Outcome,
    Payload, TransportStatus,
};
use futures::future::BoxFuture;
use serde_json::{Value, json};

/// Session controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Session;

/// Secured endpoint without a schema.
#[must_use]
pub fn definition<U, T, P>() -> AuthEndpoint<U, T, P>
where
    U: UserRepository + 'static,
    T: TokenIssuer + 'static,
    P: PasswordHasher + 'static,
{
    EndpointDefinition::new(names::SESSION, Session).secured()
}

impl<U, T, P> Controller<AuthEnvironment<U, T, P>> for Session
where
    U: UserRepository + 'static,
    T: TokenIssuer + 'static,
    P: PasswordHasher + 'static,
{
    fn call<'a>(
        &'a self,
        _env: &'a AuthEnvironment<U, T, P>,
        ctx: &'a InvocationContext,
    ) -> BoxFuture<'a, ControllerResult> {
        Box::pin(async move { session(ctx) })
    }
}

fn session(ctx: &InvocationContext) -> ControllerResult {
    let caller = ctx
        .caller()
        .ok_or_else(|| ControllerError::message("no caller on a secured endpoint"))?;

    let mut payload = Payload::new();
    payload.insert("id".to_string(), Value::String(caller.id.clone()));
    payload.insert("name".to_string(), Value::String(caller.name.clone()));
    payload.insert(
        "expiry".to_string(),
        json!(caller.expiry.map(|expiry| expiry.timestamp_millis())),
    );

    Outcome::success("Session", payload, TransportStatus::SuccessRead).into_result()
}
