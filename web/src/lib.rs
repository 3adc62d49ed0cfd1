//! # Aapkaun Web
//!
//! Transport adapters for the lifecycle engine in `aapkaun-core`.
//!
//! - **Event adapter** ([`event`]): serverless-style event record in,
//!   `{ statusCode, headers, body }` record out
//! - **Request/response adapter** ([`handlers::endpoint`]): axum handler that
//!   builds an event from the HTTP request and writes the record back
//! - **Middleware** ([`middleware`]): correlation ids and bearer token
//!   resolution
//! - **Errors** ([`AppError`]): pre-endpoint failures rendered as envelopes
//!
//! # Example
//!
//! ```ignore
//! use aapkaun_web::{ApiState, handlers, middleware::standard_layers};
//! use axum::{Router, routing::{get, post}};
//!
//! let state = ApiState::new(env, registry);
//! let router = Router::new()
//!     .route("/api/signup", post(state.endpoint("sign_up")))
//!     .route("/invoke/:endpoint", post(handlers::invoke_event))
//!     .fallback(aapkaun_web::error::route_not_found)
//!     .with_state(state);
//! let app = standard_layers(router, resolver);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod event;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use error::AppError;
pub use event::{TransportEvent, TransportResponse, handle_event};
pub use extractors::{Caller, CorrelationId, InboundEvent};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer, identity_layer, standard_layers};
pub use state::ApiState;

/// Result type for web handlers.
pub type WebResult<T> = Result<T, AppError>;
