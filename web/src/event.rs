//! Event-style transport adapter.
//!
//! Serverless platforms hand an invocation over as a single event record and
//! expect a `{ statusCode, headers, body }` record back. This module converts
//! between that shape and the lifecycle engine:
//!
//! ```text
//! TransportEvent ──into_context──► InvocationContext ──invoke──► Outcome
//!                                                                  │
//! TransportResponse ◄──────────────from_outcome────────────────────┘
//! ```
//!
//! The request/response adapter in [`crate::handlers::endpoint`] builds a
//! [`TransportEvent`] from an HTTP request and reuses [`handle_event`].

use crate::middleware::CORRELATION_ID_HEADER;
use aapkaun_core::{
    CallerIdentity, EndpointDefinition, Headers, InvocationContext, Outcome, Payload,
    RequestEnvironment, WireEnvelope, invoke, merge_input,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Inbound invocation record.
///
/// Every field may be missing or `null`; missing collections count as empty
/// and a missing `isAuthenticated` counts as `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportEvent {
    /// Request body, either JSON text or an already decoded value.
    #[serde(default)]
    pub body: Option<Value>,

    /// Query string parameters.
    #[serde(default)]
    pub query_string_parameters: Option<Payload>,

    /// Path parameters captured by the router.
    #[serde(default)]
    pub path_parameters: Option<Payload>,

    /// Request headers.
    #[serde(default)]
    pub headers: Option<Headers>,

    /// Identity resolved upstream.
    #[serde(default)]
    pub user: Option<CallerIdentity>,

    /// Whether upstream authentication succeeded.
    #[serde(default)]
    pub is_authenticated: Option<bool>,
}

impl TransportEvent {
    /// Body as a field mapping.
    ///
    /// Text is parsed as JSON. Unparseable text, non-object JSON and a
    /// missing body all yield an empty mapping.
    #[must_use]
    pub fn body_fields(&self) -> Payload {
        match &self.body {
            Some(Value::String(text)) if !text.trim().is_empty() => {
                match serde_json::from_str::<Value>(text) {
                    Ok(Value::Object(fields)) => fields,
                    Ok(_) => Payload::new(),
                    Err(err) => {
                        tracing::debug!(error = %err, "event body is not JSON; using empty input");
                        Payload::new()
                    }
                }
            }
            Some(Value::Object(fields)) => fields.clone(),
            _ => Payload::new(),
        }
    }

    /// Correlation id carried in the `X-Correlation-ID` header, if valid.
    #[must_use]
    pub fn correlation_id(&self) -> Option<Uuid> {
        self.headers
            .as_ref()?
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(CORRELATION_ID_HEADER))
            .find_map(|(_, value)| Uuid::parse_str(value).ok())
    }

    /// Build the invocation context: path, then query, then body, later
    /// sources winning on key collisions.
    #[must_use]
    pub fn into_context(self) -> InvocationContext {
        let body = self.body_fields();
        let correlation_id = self.correlation_id();
        let input = merge_input(
            self.path_parameters.unwrap_or_default(),
            self.query_string_parameters.unwrap_or_default(),
            body,
        );

        let context = InvocationContext::new(
            input,
            self.headers.unwrap_or_default(),
            self.user,
            self.is_authenticated.unwrap_or(false),
        );
        match correlation_id {
            Some(id) => context.with_correlation_id(id),
            None => context,
        }
    }
}

/// Outbound record handed back to the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportResponse {
    /// `transportStatus`, else the result code when non-zero, else 200.
    pub status_code: u16,

    /// Fixed response headers.
    pub headers: BTreeMap<String, String>,

    /// Serialized envelope.
    pub body: WireEnvelope,
}

impl TransportResponse {
    /// Map an outcome onto the transport shape.
    #[must_use]
    pub fn from_outcome(outcome: &Outcome) -> Self {
        let status_code = match outcome.transport_status() {
            Some(status) => status.as_u16(),
            None if outcome.code().as_u8() != 0 => u16::from(outcome.code().as_u8()),
            None => 200,
        };

        Self {
            status_code,
            headers: default_headers(),
            body: outcome.to_wire(),
        }
    }
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
    ])
}

/// Run `endpoint` for one event.
pub async fn handle_event<E: RequestEnvironment>(
    endpoint: &EndpointDefinition<E>,
    env: &E,
    event: TransportEvent,
) -> TransportResponse {
    let context = event.into_context();
    let correlation_id = context.correlation_id();

    let outcome = invoke(endpoint, env, context).await;
    let response = TransportResponse::from_outcome(&outcome);

    tracing::info!(
        endpoint = endpoint.name(),
        %correlation_id,
        status = response.status_code,
        code = outcome.code().as_u8(),
        "invocation responded"
    );
    response
}
