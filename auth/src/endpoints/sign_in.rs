//! Sign-in endpoint: exchange email and password for a token.

use super::{AuthEndpoint, names, respond_with_token};
use crate::environment::AuthEnvironment;
use crate::error::AuthError;
use crate::providers::{PasswordHasher, TokenIssuer, UserRepository};
use aapkaun_core::{
    Controller, ControllerError, ControllerResult, EndpointDefinition, ErrorKind, FieldRule,
    InvocationContext, Outcome, Schema, TransportStatus,
};
use futures::future::BoxFuture;

/// Sign-in controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignIn;

/// Input schema.
#[must_use]
pub fn schema() -> Schema {
    Schema::new()
        .field("email", FieldRule::string().email().required())
        .field("password", FieldRule::string().required())
}

/// Unsecured endpoint with [`schema`].
#[must_use]
pub fn definition<U, T, P>() -> AuthEndpoint<U, T, P>
where
    U: UserRepository + 'static,
    T: TokenIssuer + 'static,
    P: PasswordHasher + 'static,
{
    EndpointDefinition::new(names::SIGN_IN, SignIn).with_schema(schema())
}

impl<U, T, P> Controller<AuthEnvironment<U, T, P>> for SignIn
where
    U: UserRepository + 'static,
    T: TokenIssuer + 'static,
    P: PasswordHasher + 'static,
{
    fn call<'a>(
        &'a self,
        env: &'a AuthEnvironment<U, T, P>,
        ctx: &'a InvocationContext,
    ) -> BoxFuture<'a, ControllerResult> {
        Box::pin(sign_in(env, ctx))
    }
}

fn invalid_credentials() -> ControllerResult {
    Outcome::failure(
        "Unauthorised",
        AuthError::InvalidCredentials.to_string(),
        ErrorKind::AuthFailure,
        TransportStatus::AuthFailure,
    )
    .into_result()
}

async fn sign_in<U, T, P>(env: &AuthEnvironment<U, T, P>, ctx: &InvocationContext) -> ControllerResult
where
    U: UserRepository,
    T: TokenIssuer,
    P: PasswordHasher,
{
    let (Some(email), Some(password)) = (ctx.str("email"), ctx.str("password")) else {
        return Err(ControllerError::message("sign-in input is incomplete"));
    };

    let Some(user) = env.user_service().get_user_by_email(email).await? else {
        tracing::info!("sign-in rejected: unknown email");
        return invalid_credentials();
    };
    let Some(hash) = user.password.as_deref() else {
        tracing::info!(user_id = %user.id, "sign-in rejected: no password set");
        return invalid_credentials();
    };
    if !env.passwords.verify(password, hash)? {
        tracing::info!(user_id = %user.id, "sign-in rejected: wrong password");
        return invalid_credentials();
    }

    respond_with_token("Sign In", env, &user)
}
