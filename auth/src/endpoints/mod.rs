//! Account endpoints.
//!
//! Each endpoint is a unit-struct controller plus a `definition()` that
//! wires its auth flag and schema. [`registry`] collects all of them under
//! their registration names.

use crate::environment::AuthEnvironment;
use crate::model::User;
use crate::providers::{PasswordHasher, TokenClaims, TokenIssuer, UserRepository};
use aapkaun_core::{
    ControllerError, ControllerResult, EndpointDefinition, EndpointRegistry, Outcome, Payload,
    RegistryError, TransportStatus,
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

pub mod session;
pub mod sign_in;
pub mod sign_up;
pub mod users;

pub use session::Session;
pub use sign_in::SignIn;
pub use sign_up::SignUp;
pub use users::{GetUser, ListUsers};

/// Endpoint definition over the account environment.
pub type AuthEndpoint<U, T, P> = EndpointDefinition<AuthEnvironment<U, T, P>>;

/// Registration names.
pub mod names {
    /// Create an account.
    pub const SIGN_UP: &str = "sign_up";
    /// Exchange credentials for a token.
    pub const SIGN_IN: &str = "sign_in";
    /// Describe the caller's session.
    pub const SESSION: &str = "session";
    /// List accounts.
    pub const LIST_USERS: &str = "list_users";
    /// Fetch one account.
    pub const GET_USER: &str = "get_user";
}

/// Every account endpoint, registered by name.
///
/// # Errors
///
/// Returns [`RegistryError::Duplicate`] if two endpoints share a name.
pub fn registry<U, T, P>() -> Result<EndpointRegistry<AuthEnvironment<U, T, P>>, RegistryError>
where
    U: UserRepository + 'static,
    T: TokenIssuer + 'static,
    P: PasswordHasher + 'static,
{
    EndpointRegistry::new()
        .with(sign_up::definition())?
        .with(sign_in::definition())?
        .with(session::definition())?
        .with(users::list_definition())?
        .with(users::get_definition())
}

/// Token response body shared by sign-up and sign-in.
fn token_payload(token: String, expiry: DateTime<Utc>) -> Payload {
    let mut payload = Payload::new();
    payload.insert("token".to_string(), Value::String(token));
    payload.insert("expiry".to_string(), json!(expiry.timestamp_millis()));
    payload.insert("token_type".to_string(), json!("bearer"));
    payload
}

/// Issue a fresh token for `user` and wrap it in a success outcome.
fn respond_with_token<U, T, P>(
    description: &str,
    env: &AuthEnvironment<U, T, P>,
    user: &User,
) -> ControllerResult
where
    U: UserRepository,
    T: TokenIssuer,
    P: PasswordHasher,
{
    let expiry = env
        .clock
        .now()
        .checked_add_signed(env.token_ttl)
        .ok_or_else(|| ControllerError::message("token lifetime out of range"))?;
    let claims = TokenClaims::new(user.id.to_string(), user.name.full(), expiry);
    let token = env.tokens.issue(&claims)?;

    tracing::info!(user_id = %user.id, "issued bearer token");
    Outcome::success(
        description,
        token_payload(token, expiry),
        TransportStatus::SuccessRead,
    )
    .into_result()
}
