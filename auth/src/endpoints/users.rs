//! User listing endpoints.

use super::{AuthEndpoint, names};
use crate::environment::AuthEnvironment;
use crate::model::User;
use crate::providers::{PasswordHasher, TokenIssuer, UserRepository};
use aapkaun_core::{
    Controller, ControllerError, ControllerResult, EndpointDefinition, ErrorKind, FieldRule,
    InvocationContext, Outcome, Payload, Schema, TransportStatus,
};
use futures::future::BoxFuture;
use serde_json::{Value, json};

/// Lists every account.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListUsers;

/// Fetches one account by id.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetUser;

/// Secured list endpoint.
#[must_use]
pub fn list_definition<U, T, P>() -> AuthEndpoint<U, T, P>
where
    U: UserRepository + 'static,
    T: TokenIssuer + 'static,
    P: PasswordHasher + 'static,
{
    EndpointDefinition::new(names::LIST_USERS, ListUsers).secured()
}

/// Secured lookup endpoint; `id` comes from the path.
#[must_use]
pub fn get_definition<U, T, P>() -> AuthEndpoint<U, T, P>
where
    U: UserRepository + 'static,
    T: TokenIssuer + 'static,
    P: PasswordHasher + 'static,
{
    EndpointDefinition::new(names::GET_USER, GetUser)
        .secured()
        .with_schema(Schema::new().field("id", FieldRule::string().required()))
}

impl<U, T, P> Controller<AuthEnvironment<U, T, P>> for ListUsers
where
    U: UserRepository + 'static,
    T: TokenIssuer + 'static,
    P: PasswordHasher + 'static,
{
    fn call<'a>(
        &'a self,
        env: &'a AuthEnvironment<U, T, P>,
        _ctx: &'a InvocationContext,
    ) -> BoxFuture<'a, ControllerResult> {
        Box::pin(list_users(env))
    }
}

impl<U, T, P> Controller<AuthEnvironment<U, T, P>> for GetUser
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
        Box::pin(get_user(env, ctx))
    }
}

async fn list_users<U, T, P>(env: &AuthEnvironment<U, T, P>) -> ControllerResult
where
    U: UserRepository,
    T: TokenIssuer,
    P: PasswordHasher,
{
    let users = env.user_service().list_users().await?;

    let mut payload = Payload::new();
    payload.insert("count".to_string(), json!(users.len()));
    payload.insert(
        "users".to_string(),
        Value::Array(users.iter().map(User::summary).collect()),
    );
    Outcome::success("Users", payload, TransportStatus::SuccessRead).into_result()
}

async fn get_user<U, T, P>(env: &AuthEnvironment<U, T, P>, ctx: &InvocationContext) -> ControllerResult
where
    U: UserRepository,
    T: TokenIssuer,
    P: PasswordHasher,
{
    let id = ctx
        .str("id")
        .ok_or_else(|| ControllerError::message("user id is missing"))?;

    match env.user_service().get_user_by_id(id).await? {
        Some(user) => {
            let mut payload = Payload::new();
            payload.insert("user".to_string(), user.summary());
            Outcome::success("User", payload, TransportStatus::SuccessRead).into_result()
        }
        None => Outcome::failure(
            "Not Found",
            "User not found",
            ErrorKind::NotFound,
            TransportStatus::NotFound,
        )
        .into_result(),
    }
}
