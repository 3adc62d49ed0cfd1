//! # Aapkaun Server
//!
//! Wires the account endpoints from `aapkaun-auth` into an axum router:
//! configuration, environment construction, endpoint registration and the
//! route table all happen once, before the first request.
//!
//! | method | path                | endpoint     |
//! |--------|---------------------|--------------|
//! | POST   | `/api/signup`       | `sign_up`    |
//! | POST   | `/api/signin`       | `sign_in`    |
//! | GET    | `/api/session`      | `session`    |
//! | GET    | `/api/users`        | `list_users` |
//! | GET    | `/api/users/:id`    | `get_user`   |
//! | POST   | `/invoke/:endpoint` | any, event-style |
//! | GET    | `/health`, `/ready` | probes       |
//!
//! Everything else answers with a `NOT_FOUND` envelope.

pub mod config;

use aapkaun_auth::AuthEnvironment;
use aapkaun_auth::config::{PasswordConfig, TokenConfig};
use aapkaun_auth::endpoints::{self, names};
use aapkaun_auth::providers::{JwtTokenIssuer, Sha256PasswordHasher};
use aapkaun_auth::stores::InMemoryUserRepository;
use aapkaun_core::guard::DocsReferer;
use aapkaun_core::{Clock, IdentityResolver};
use aapkaun_web::error::route_not_found;
use aapkaun_web::handlers::{health_check, invoke_event, readiness_check};
use aapkaun_web::{ApiState, standard_layers};
use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use config::Config;
use std::sync::Arc;

/// The environment every endpoint runs against.
pub type Environment = AuthEnvironment<InMemoryUserRepository, JwtTokenIssuer, Sha256PasswordHasher>;

/// Build the environment described by `config`.
///
/// # Errors
///
/// Fails when `config` does not pass [`Config::validate`].
pub fn build_environment(config: &Config, clock: Arc<dyn Clock>) -> anyhow::Result<Environment> {
    config.validate()?;
    let token_config = TokenConfig::new(config.auth.jwt_secret.clone()).with_ttl(config.auth.token_ttl());
    let docs_referer = DocsReferer::new(&config.auth.docs_referer_pattern, config.auth.docs_grace())
        .context("invalid AUTH_DOCS_REFERER_PATTERN")?;

    Ok(AuthEnvironment::new(
        InMemoryUserRepository::with_clock(Arc::clone(&clock)),
        Arc::new(JwtTokenIssuer::new(&token_config)),
        Sha256PasswordHasher::new(
            PasswordConfig::new().with_work_factor(config.auth.password_work_factor),
        ),
        clock,
    )
    .with_token_ttl(token_config.ttl)
    .with_docs_referer(docs_referer))
}

/// Build the complete axum router.
pub fn build_router(state: ApiState<Environment>) -> Router {
    let api_routes = Router::new()
        .route("/signup", post(state.endpoint(names::SIGN_UP)))
        .route("/signin", post(state.endpoint(names::SIGN_IN)))
        .route("/session", get(state.endpoint(names::SESSION)))
        .route("/users", get(state.endpoint(names::LIST_USERS)))
        .route("/users/:id", get(state.endpoint(names::GET_USER)));

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check::<Environment>))
        // Event-style entry point
        .route("/invoke/:endpoint", post(invoke_event::<Environment>))
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .with_state(state)
}

/// Environment, endpoint table, routes and middleware in one call.
///
/// # Errors
///
/// Fails when the environment cannot be built or two endpoints share a name.
pub fn build_app(config: &Config, clock: Arc<dyn Clock>) -> anyhow::Result<Router> {
    let env = build_environment(config, clock)?;
    let resolver: Arc<dyn IdentityResolver> = env.tokens.clone();

    let registry = endpoints::registry::<InMemoryUserRepository, JwtTokenIssuer, Sha256PasswordHasher>()
        .context("endpoint registration failed")?;
    tracing::info!(
        endpoints = ?registry.names().collect::<Vec<_>>(),
        "endpoints registered"
    );

    let state = ApiState::new(env, registry);
    Ok(standard_layers(build_router(state), resolver))
}
