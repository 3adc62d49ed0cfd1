//! Request/response adapter.
//!
//! Each route is bound to one registered endpoint. The request is turned into
//! a [`TransportEvent`] by [`InboundEvent`], run through the event adapter, and
//! the resulting [`TransportResponse`] is written back as status plus JSON
//! body.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/signup", post(state.endpoint(names::SIGN_UP)))
//!     .route("/api/users/:id", get(state.endpoint(names::GET_USER)));
//! ```

use crate::event::{TransportEvent, TransportResponse};
use crate::extractors::InboundEvent;
use crate::state::ApiState;
use aapkaun_core::RequestEnvironment;
use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;

/// Handler closure produced by [`ApiState::endpoint`].
pub trait EndpointHandler:
    Fn(InboundEvent) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
{
}

impl<F> EndpointHandler for F where
    F: Fn(InboundEvent) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
{
}

impl<E: RequestEnvironment> ApiState<E> {
    /// Axum handler running the endpoint registered as `name`.
    ///
    /// The name is resolved per request, so an unregistered name answers
    /// every request with a `NOT_FOUND` envelope rather than failing here.
    pub fn endpoint(&self, name: &'static str) -> impl EndpointHandler + use<E> {
        let state = self.clone();
        move |InboundEvent(event): InboundEvent| {
            let state = state.clone();
            Box::pin(async move { respond(&state, name, event).await }) as BoxFuture<'static, Response>
        }
    }
}

async fn respond<E: RequestEnvironment>(
    state: &ApiState<E>,
    name: &str,
    event: TransportEvent,
) -> Response {
    match state.dispatch(name, event).await {
        Ok(response) => response.into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for TransportResponse {
    /// A `statusCode` outside the HTTP range (the bare result code `1`)
    /// becomes 500.
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.body)).into_response();

        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!(header = %name, "dropping unrepresentable response header"),
            }
        }
        response
    }
}
