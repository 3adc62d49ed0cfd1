//! Sign-up endpoint: create an account and grant a token.

use super::{AuthEndpoint, names, respond_with_token};
use crate::environment::AuthEnvironment;
use crate::error::AuthError;
use crate::model::{EmailAddress, PersonName};
use crate::providers::{PasswordHasher, TokenIssuer, UserRepository};
use aapkaun_core::{
    Controller, ControllerError, ControllerResult, EndpointDefinition, ErrorKind, FieldRule,
    InvocationContext, Outcome, Schema, TransportStatus,
};
use futures::future::BoxFuture;

/// Sign-up controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignUp;

/// Input schema.
#[must_use]
pub fn schema() -> Schema {
    Schema::new()
        .field("email", FieldRule::string().email().required())
        .field("password", FieldRule::string().min(6).max(16).required())
        .field("firstName", FieldRule::string().min(3).max(20).required())
        .field("company", FieldRule::string().min(3).required())
        .field("lastName", FieldRule::string().min(3).max(20).required())
}

/// Unsecured endpoint with [`schema`].
#[must_use]
pub fn definition<U, T, P>() -> AuthEndpoint<U, T, P>
where
    U: UserRepository + 'static,
    T: TokenIssuer + 'static,
    P: PasswordHasher + 'static,
{
    EndpointDefinition::new(names::SIGN_UP, SignUp).with_schema(schema())
}

impl<U, T, P> Controller<AuthEnvironment<U, T, P>> for SignUp
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
        Box::pin(sign_up(env, ctx))
    }
}

async fn sign_up<U, T, P>(env: &AuthEnvironment<U, T, P>, ctx: &InvocationContext) -> ControllerResult
where
    U: UserRepository,
    T: TokenIssuer,
    P: PasswordHasher,
{
    let (Some(email), Some(password), Some(first_name), Some(last_name)) = (
        ctx.str("email"),
        ctx.str("password"),
        ctx.str("firstName"),
        ctx.str("lastName"),
    ) else {
        return Err(ControllerError::message("sign-up input is incomplete"));
    };

    let users = env.user_service();
    if users.get_user_by_email(email).await?.is_some() {
        tracing::info!("sign-up rejected: email already registered");
        return already_exists();
    }

    let mut user = users.create_user();
    user.name = PersonName::new(first_name, last_name);
    user.emails.push(EmailAddress::primary(email));
    user.password = Some(env.passwords.hash(password)?);
    let user = match users.save_user(&user).await {
        Ok(user) => user,
        Err(AuthError::UserAlreadyExists) => {
            tracing::info!("sign-up rejected: email registered concurrently");
            return already_exists();
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        user_id = %user.id,
        company = ctx.str("company").unwrap_or_default(),
        "user signed up"
    );
    respond_with_token("Sign Up", env, &user)
}

fn already_exists() -> ControllerResult {
    Outcome::failure(
        "User Already Exists",
        "User Already Exists",
        ErrorKind::ValidationFailed,
        TransportStatus::BadRequest,
    )
    .into_result()
}
