//! Tower middleware in front of the endpoint handlers.
//!
//! - **Correlation id**: read `X-Correlation-ID` or generate one, make it
//!   visible to the handler and echo it on the response
//! - **Identity**: resolve `Authorization: Bearer <token>` into a
//!   [`CallerIdentity`] request extension
//!
//! [`standard_layers`] wraps a router with both plus request tracing and
//! permissive CORS.
//!
//! # Example
//!
//! ```ignore
//! use aapkaun_web::middleware::standard_layers;
//!
//! let app = standard_layers(router, resolver);
//! ```

use aapkaun_core::{CallerIdentity, IdentityResolver};
use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header::AUTHORIZATION},
    response::Response,
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

type BoxResponseFuture<E> =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, E>> + Send>>;

/// Wrap `router` with tracing, CORS, correlation ids and bearer resolution.
///
/// Layers run outermost first: trace, CORS, correlation id, identity.
pub fn standard_layers<S>(router: Router<S>, resolver: Arc<dyn IdentityResolver>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(correlation_id_layer())
            .layer(identity_layer(resolver)),
    )
}

/// Create a layer that adds correlation ID tracking to all requests.
///
/// The id ends up in three places: the request extensions, the request's
/// own `X-Correlation-ID` header (so the event adapter sees it) and the
/// response header.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxResponseFuture<S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(correlation_id);
        let header_value = HeaderValue::from_str(&correlation_id.to_string()).ok();
        if let Some(value) = header_value.clone() {
            req.headers_mut().insert(CORRELATION_ID_HEADER, value);
        }

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            uri = %req.uri(),
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            if let Some(value) = header_value {
                response.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }

            Ok(response)
        })
    }
}

/// Create a layer resolving bearer tokens through `resolver`.
///
/// A missing, malformed or unresolvable token leaves the request anonymous;
/// whether that is acceptable is decided per endpoint by the guard.
#[must_use]
pub fn identity_layer(resolver: Arc<dyn IdentityResolver>) -> IdentityLayer {
    IdentityLayer { resolver }
}

/// Layer for bearer token resolution.
#[derive(Clone)]
pub struct IdentityLayer {
    resolver: Arc<dyn IdentityResolver>,
}

impl std::fmt::Debug for IdentityLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityLayer").finish_non_exhaustive()
    }
}

impl<S> Layer<S> for IdentityLayer {
    type Service = IdentityMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        IdentityMiddleware {
            inner,
            resolver: Arc::clone(&self.resolver),
        }
    }
}

/// Middleware service for bearer token resolution.
#[derive(Clone)]
pub struct IdentityMiddleware<S> {
    inner: S,
    resolver: Arc<dyn IdentityResolver>,
}

impl<S> Service<Request> for IdentityMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        if let Some(token) = bearer_token(&req) {
            match self.resolver.resolve(token) {
                Some(caller) => {
                    tracing::debug!(user_id = %caller.id, "bearer token resolved");
                    req.extensions_mut().insert::<CallerIdentity>(caller);
                }
                None => tracing::debug!("bearer token rejected; caller stays anonymous"),
            }
        }

        self.inner.call(req)
    }
}

/// Token after a case-insensitive `Bearer ` scheme.
fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    struct OneToken;

    impl IdentityResolver for OneToken {
        fn resolve(&self, token: &str) -> Option<CallerIdentity> {
            (token == "good").then(|| CallerIdentity {
                id: "user-1".to_string(),
                name: "Ada".to_string(),
                expiry: None,
            })
        }
    }

    async fn whoami(req: Request<Body>) -> String {
        req.extensions()
            .get::<CallerIdentity>()
            .map_or_else(|| "anonymous".to_string(), |caller| caller.id.clone())
    }

    fn app() -> Router {
        Router::new()
            .route("/test", get(|| async { "ok" }))
            .route("/whoami", get(whoami))
            .layer(identity_layer(Arc::new(OneToken)))
            .layer(correlation_id_layer())
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_correlation_id_generated_if_missing() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app().oneshot(request).await.unwrap();

        let correlation_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("Correlation ID header should be present");
        assert!(Uuid::parse_str(correlation_id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_correlation_id_preserved_from_request() {
        let request_uuid = Uuid::new_v4();
        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, request_uuid.to_string())
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        let response_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(response_id, request_uuid.to_string());
    }

    #[tokio::test]
    async fn test_invalid_uuid_generates_new() {
        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        let uuid_str = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(Uuid::parse_str(uuid_str).is_ok());
    }

    #[tokio::test]
    async fn test_bearer_token_resolves_caller() {
        let request = Request::builder()
            .uri("/whoami")
            .header(AUTHORIZATION, "bearer good")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(body_text(response).await, "user-1");
    }

    #[tokio::test]
    async fn test_bad_or_missing_token_stays_anonymous() {
        for header in [Some("Bearer bad"), Some("Basic good"), Some("Bearer "), None] {
            let mut builder = Request::builder().uri("/whoami");
            if let Some(value) = header {
                builder = builder.header(AUTHORIZATION, value);
            }
            let response = app()
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(body_text(response).await, "anonymous", "{header:?}");
        }
    }
}
