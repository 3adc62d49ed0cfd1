//! Error types for web handlers.
//!
//! Failures that happen before an endpoint runs (unknown route, unreadable
//! body, unknown event target) are rendered with the same envelope the
//! lifecycle engine produces, so clients only ever parse one shape.

use aapkaun_core::{ErrorKind, Outcome, TransportStatus};
use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(Path(name): Path<String>) -> Result<Response, AppError> {
///     let endpoint = registry.get(&name).ok_or_else(|| AppError::not_found("endpoint", &name))?;
///     ...
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// Envelope status.
    status: TransportStatus,
    /// Envelope classification.
    kind: ErrorKind,
    /// Short label.
    description: &'static str,
    /// Error message (user-facing)
    message: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(
        status: TransportStatus,
        kind: ErrorKind,
        description: &'static str,
        message: String,
    ) -> Self {
        Self {
            status,
            kind,
            description,
            message,
            source: None,
        }
    }

    /// Attach the underlying error; it is logged, never sent.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            TransportStatus::BadRequest,
            ErrorKind::BadRequest,
            "Bad Request",
            message.into(),
        )
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            TransportStatus::NotFound,
            ErrorKind::NotFound,
            "Not Found",
            format!("{resource} {id} not found"),
        )
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            TransportStatus::ServerError,
            ErrorKind::ServerError,
            "Server Error",
            message.into(),
        )
    }

    /// Envelope status.
    #[must_use]
    pub const fn status(&self) -> TransportStatus {
        self.status
    }

    /// The envelope this error renders as.
    #[must_use]
    pub fn to_outcome(&self) -> Outcome {
        Outcome::failure(self.description, self.message.clone(), self.kind, self.status)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(source) = &self.source {
            tracing::error!(
                status = %self.status,
                kind = self.kind.as_str(),
                message = %self.message,
                error = ?source,
                "request failed before reaching an endpoint"
            );
        } else {
            tracing::debug!(
                status = %self.status,
                kind = self.kind.as_str(),
                message = %self.message,
                "request failed before reaching an endpoint"
            );
        }

        let status = StatusCode::from_u16(self.status.as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_outcome().to_wire())).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

/// Router fallback: every unknown route is a `NOT_FOUND` envelope.
#[allow(clippy::unused_async)]
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::not_found("route", uri.path())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[bad_request] Invalid input");
    }

    #[test]
    fn test_not_found_envelope() {
        let outcome = AppError::not_found("route", "/nope").to_outcome();
        let value = serde_json::to_value(outcome).unwrap();

        assert_eq!(
            value,
            json!({
                "description": "Not Found",
                "code": 1,
                "response": {},
                "errorDescription": "route /nope not found",
                "errorClass": "not_found",
                "statusCode": 404
            })
        );
    }

    #[tokio::test]
    async fn test_into_response_uses_envelope_status() {
        let response = AppError::from(anyhow::anyhow!("db exploded")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errorDescription"], "An internal error occurred");
        assert_eq!(body["errorClass"], "server_error");
    }
}
