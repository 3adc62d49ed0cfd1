//! Event entry point: `POST /invoke/:endpoint`.
//!
//! Accepts a serverless-style event as JSON and returns the transport
//! response record verbatim (HTTP 200 wrapping `{ statusCode, headers, body }`).
//! Identity is never taken from the posted event; `user` and
//! `isAuthenticated` are overwritten with whatever the bearer token on the
//! HTTP request resolved to.

use crate::WebResult;
use crate::error::AppError;
use crate::event::{TransportEvent, TransportResponse};
use crate::extractors::{Caller, CorrelationId};
use crate::middleware::CORRELATION_ID_HEADER;
use crate::state::ApiState;
use aapkaun_core::RequestEnvironment;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

/// Run the named endpoint for a posted event.
///
/// # Errors
///
/// `BAD_REQUEST` when the body is not an event, `NOT_FOUND` when no endpoint
/// is registered under the name.
pub async fn invoke_event<E: RequestEnvironment>(
    State(state): State<ApiState<E>>,
    Path(name): Path<String>,
    Caller(caller): Caller,
    CorrelationId(correlation_id): CorrelationId,
    payload: Result<Json<TransportEvent>, JsonRejection>,
) -> WebResult<Json<TransportResponse>> {
    let Json(mut event) =
        payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    event.is_authenticated = Some(caller.is_some());
    event.user = caller;
    if event.correlation_id().is_none() {
        event
            .headers
            .get_or_insert_with(Default::default)
            .insert(CORRELATION_ID_HEADER.to_ascii_lowercase(), correlation_id.to_string());
    }

    Ok(Json(state.dispatch(&name, event).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use aapkaun_core::{
        EndpointDefinition, EndpointRegistry, InvocationContext, Outcome, Payload,
        TransportStatus, controller_fn,
    };
    use aapkaun_testing::TestEnvironment;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
        routing::post,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        let whoami = EndpointDefinition::new(
            "whoami",
            controller_fn(|_env: &TestEnvironment, ctx: &InvocationContext| {
                let mut payload = Payload::new();
                payload.insert("input".to_string(), Value::Object(ctx.data().clone()));
                payload.insert("authenticated".to_string(), json!(ctx.is_authenticated()));
                payload.insert(
                    "correlationId".to_string(),
                    json!(ctx.correlation_id().to_string()),
                );
                async move { Outcome::success("Who", payload, TransportStatus::SuccessRead).into_result() }
            }),
        );
        let state = ApiState::new(
            TestEnvironment::new(),
            EndpointRegistry::new().with(whoami).unwrap(),
        );
        Router::new()
            .route("/invoke/:endpoint", post(invoke_event::<TestEnvironment>))
            .with_state(state)
    }

    async fn post_event(uri: &str, body: &str) -> Response {
        app()
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_returns_transport_response_verbatim() {
        let event = json!({
            "body": "{\"name\":\"Ada\"}",
            "queryStringParameters": { "page": "2" },
            "user": { "id": "spoofed", "name": "Eve" },
            "isAuthenticated": true
        });

        let response = post_event("/invoke/whoami", &event.to_string()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let record = json_body(response).await;
        assert_eq!(record["statusCode"], 200);
        assert_eq!(record["headers"]["Content-Type"], "application/json");
        assert_eq!(record["body"]["response"]["input"], json!({ "name": "Ada", "page": "2" }));
        assert_eq!(record["body"]["response"]["authenticated"], false);
        assert!(
            uuid::Uuid::parse_str(record["body"]["response"]["correlationId"].as_str().unwrap())
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_unknown_endpoint_is_not_found() {
        let response = post_event("/invoke/missing", "{}").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["errorClass"], "not_found");
    }

    #[tokio::test]
    async fn test_malformed_event_is_bad_request() {
        let response = post_event("/invoke/whoami", "[1, 2").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["errorClass"], "bad_request");
    }
}
