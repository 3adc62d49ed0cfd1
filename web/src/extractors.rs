//! Custom Axum extractors.
//!
//! - `CorrelationId`: the id assigned by the correlation middleware
//! - `Caller`: the identity resolved by the identity middleware, if any
//! - `InboundEvent`: the whole request translated into a [`TransportEvent`]

use crate::error::AppError;
use crate::event::TransportEvent;
use crate::middleware::CORRELATION_ID_HEADER;
use aapkaun_core::{CallerIdentity, Headers, Payload};
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{HeaderMap, request::Parts},
};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Largest request body accepted by [`InboundEvent`].
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Correlation ID for request tracing.
///
/// Prefers the id stored by [`crate::middleware::correlation_id_layer`],
/// then the `X-Correlation-ID` header, then a fresh UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .or_else(|| {
                parts
                    .headers
                    .get(CORRELATION_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| Uuid::parse_str(s).ok())
            })
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Identity resolved from the bearer token; `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<CallerIdentity>);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<CallerIdentity>().cloned()))
    }
}

/// The request as an event: path, query, headers, body text and identity.
///
/// `isAuthenticated` is set exactly when an identity was resolved.
#[derive(Debug, Clone)]
pub struct InboundEvent(pub TransportEvent);

#[async_trait]
impl<S> FromRequest<S> for InboundEvent
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let path = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Path(params)| params)
            .unwrap_or_default();
        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(params)| params)
            .unwrap_or_default();
        let caller = parts.extensions.get::<CallerIdentity>().cloned();

        let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|err| AppError::bad_request("request body could not be read").with_source(err.into()))?;
        let text = String::from_utf8_lossy(&bytes);

        Ok(Self(TransportEvent {
            body: (!text.trim().is_empty()).then(|| Value::String(text.into_owned())),
            query_string_parameters: Some(string_fields(query)),
            path_parameters: Some(string_fields(path)),
            headers: Some(header_fields(&parts.headers)),
            is_authenticated: Some(caller.is_some()),
            user: caller,
        }))
    }
}

fn string_fields(params: HashMap<String, String>) -> Payload {
    params
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

/// Lower-cased header names; values that are not visible ASCII are dropped.
fn header_fields(headers: &HeaderMap) -> Headers {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::{Json, Router, body::Body, http::Request as HttpRequest, routing::post};
    use serde_json::json;
    use tower::ServiceExt;

    async fn echo_event(InboundEvent(event): InboundEvent) -> Json<TransportEvent> {
        Json(event)
    }

    async fn send(request: HttpRequest<Body>) -> TransportEvent {
        let app = Router::new()
            .route("/items/:id", post(echo_event))
            .route("/items", post(echo_event));
        let response = app.oneshot(request).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_request_becomes_event() {
        let event = send(
            HttpRequest::post("/items/42?page=2")
                .header("Referer", "https://x/docs/api")
                .body(Body::from(r#"{"name":"widget"}"#))
                .unwrap(),
        )
        .await;

        assert_eq!(event.path_parameters.unwrap()["id"], "42");
        assert_eq!(event.query_string_parameters.unwrap()["page"], "2");
        assert_eq!(event.headers.unwrap()["referer"], "https://x/docs/api");
        assert_eq!(event.body, Some(json!(r#"{"name":"widget"}"#)));
        assert_eq!(event.is_authenticated, Some(false));
        assert!(event.user.is_none());
    }

    #[tokio::test]
    async fn test_route_without_params_and_body() {
        let event = send(HttpRequest::post("/items").body(Body::empty()).unwrap()).await;

        assert!(event.path_parameters.unwrap().is_empty());
        assert!(event.query_string_parameters.unwrap().is_empty());
        assert!(event.body.is_none());
    }

    #[tokio::test]
    async fn test_correlation_id_prefers_extension() {
        let id = Uuid::new_v4();
        let mut request = HttpRequest::get("/").body(()).unwrap();
        request.extensions_mut().insert(id);
        let (mut parts, ()) = request.into_parts();

        let CorrelationId(found) = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(found, id);
    }
}
