//! Response envelope.
//!
//! [`Outcome`] is the only legal result of a controller and the only thing
//! the engine ever hands to a transport. It is a plain data carrier: the
//! constructor does not check that `code`, `error_kind` and
//! `transport_status` agree with each other.

use crate::error::{ErrorKind, TransportStatus};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Result data carried by an outcome.
pub type Payload = Map<String, Value>;

/// Binary result code: 0 for success, 1 for failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// `0`
    Success,
    /// `1`
    Failure,
}

impl ResultCode {
    /// Numeric form used on the wire.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }

    /// `true` for [`ResultCode::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Standardized result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    description: String,
    code: ResultCode,
    payload: Payload,
    error_description: Option<String>,
    error_kind: Option<ErrorKind>,
    transport_status: Option<TransportStatus>,
}

impl Outcome {
    /// Build an outcome from its six positional parts.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        code: ResultCode,
        payload: Payload,
        error_description: Option<String>,
        error_kind: Option<ErrorKind>,
        transport_status: Option<TransportStatus>,
    ) -> Self {
        Self {
            description: description.into(),
            code,
            payload,
            error_description,
            error_kind,
            transport_status,
        }
    }

    /// Successful outcome with the given payload.
    #[must_use]
    pub fn success(
        description: impl Into<String>,
        payload: Payload,
        status: TransportStatus,
    ) -> Self {
        Self::new(description, ResultCode::Success, payload, None, None, Some(status))
    }

    /// Failed outcome with an empty payload.
    #[must_use]
    pub fn failure(
        description: impl Into<String>,
        error_description: impl Into<String>,
        kind: ErrorKind,
        status: TransportStatus,
    ) -> Self {
        Self::new(
            description,
            ResultCode::Failure,
            Payload::new(),
            Some(error_description.into()),
            Some(kind),
            Some(status),
        )
    }

    /// Short human label.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Binary result code.
    #[must_use]
    pub const fn code(&self) -> ResultCode {
        self.code
    }

    /// Result data.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Human detail, failures only.
    #[must_use]
    pub fn error_description(&self) -> Option<&str> {
        self.error_description.as_deref()
    }

    /// Failure classification, failures only.
    #[must_use]
    pub const fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    /// Transport status, if one was supplied.
    #[must_use]
    pub const fn transport_status(&self) -> Option<TransportStatus> {
        self.transport_status
    }

    /// Plain mapping handed to the transport.
    #[must_use]
    pub fn to_wire(&self) -> WireEnvelope {
        WireEnvelope {
            description: self.description.clone(),
            code: self.code.as_u8(),
            response: self.payload.clone(),
            error_description: self.error_description.clone(),
            error_class: self.error_kind,
            status_code: self.transport_status.map(TransportStatus::as_u16),
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

/// Serialized envelope body.
///
/// ```json
/// { "description": "...", "code": 0, "response": {},
///   "errorDescription": "...", "errorClass": "...", "statusCode": 200 }
/// ```
///
/// `errorDescription`, `errorClass` and `statusCode` are omitted when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEnvelope {
    /// Short human label.
    pub description: String,
    /// `0` or `1`.
    pub code: u8,
    /// Controller payload.
    pub response: Payload,
    /// Failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    /// Failure classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_class: Option<ErrorKind>,
    /// Transport status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_wire_shape_omits_error_fields() {
        let mut payload = Payload::new();
        payload.insert("token".to_string(), json!("abc"));
        let outcome = Outcome::success("Sign Up", payload, TransportStatus::SuccessRead);

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!({
                "description": "Sign Up",
                "code": 0,
                "response": { "token": "abc" },
                "statusCode": 200
            })
        );
    }

    #[test]
    fn test_failure_wire_shape() {
        let outcome = Outcome::failure(
            "Bad Request",
            "\"email\" is required",
            ErrorKind::ValidationFailed,
            TransportStatus::BadRequest,
        );

        let wire = outcome.to_wire();
        assert_eq!(wire.code, 1);
        assert!(wire.response.is_empty());
        assert_eq!(wire.error_class, Some(ErrorKind::ValidationFailed));
        assert_eq!(wire.status_code, Some(400));

        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["errorClass"], json!("validation_failed"));
        assert_eq!(value["errorDescription"], json!("\"email\" is required"));
    }

    #[test]
    fn test_constructor_does_not_enforce_consistency() {
        let outcome = Outcome::new(
            "odd",
            ResultCode::Success,
            Payload::new(),
            Some("still here".to_string()),
            Some(ErrorKind::NotFound),
            None,
        );
        assert!(outcome.code().is_success());
        assert_eq!(outcome.error_kind(), Some(ErrorKind::NotFound));
        assert_eq!(outcome.transport_status(), None);
    }
}
