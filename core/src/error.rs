//! Error and status vocabulary.
//!
//! Two closed lookup tables shared by every layer: the machine-readable
//! [`ErrorKind`] carried in failed envelopes, and the [`TransportStatus`]
//! codes handed back to the transport. Neither has behaviour beyond the
//! mapping to its wire representation.
//!
//! [`ControllerError`] is the failure type a controller returns when it
//! cannot produce an outcome at all; the engine turns it into a
//! `SERVER_ERROR` envelope.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable failure classification.
///
/// Serialized as the `errorClass` field of the wire envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Input did not satisfy the endpoint schema.
    #[serde(rename = "validation_failed")]
    ValidationFailed,

    /// The controller failed or returned a malformed result.
    #[serde(rename = "server_error")]
    ServerError,

    /// The authorization guard rejected the caller.
    #[serde(rename = "auth_failed")]
    AuthFailure,

    /// A requested resource does not exist.
    #[serde(rename = "not_found")]
    NotFound,

    /// The request was understood but cannot be honoured.
    #[serde(rename = "bad_request")]
    BadRequest,
}

impl ErrorKind {
    /// Wire string for this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// # use aapkaun_core::ErrorKind;
    /// assert_eq!(ErrorKind::AuthFailure.as_str(), "auth_failed");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "validation_failed",
            Self::ServerError => "server_error",
            Self::AuthFailure => "auth_failed",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
        }
    }

    /// Status code conventionally paired with this kind.
    #[must_use]
    pub const fn default_status(self) -> TransportStatus {
        match self {
            Self::ValidationFailed | Self::BadRequest => TransportStatus::BadRequest,
            Self::ServerError => TransportStatus::ServerError,
            Self::AuthFailure => TransportStatus::AuthFailure,
            Self::NotFound => TransportStatus::NotFound,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric status handed back to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum TransportStatus {
    /// 200, successful read.
    SuccessRead,
    /// 201, successful write.
    SuccessWrite,
    /// 400.
    BadRequest,
    /// 403.
    AuthFailure,
    /// 404.
    NotFound,
    /// 500.
    ServerError,
}

impl TransportStatus {
    /// Numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::SuccessRead => 200,
            Self::SuccessWrite => 201,
            Self::BadRequest => 400,
            Self::AuthFailure => 403,
            Self::NotFound => 404,
            Self::ServerError => 500,
        }
    }
}

impl From<TransportStatus> for u16 {
    fn from(status: TransportStatus) -> Self {
        status.as_u16()
    }
}

/// Returned when a numeric code is outside the closed status set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("status code {0} is not part of the transport vocabulary")]
pub struct UnknownStatus(pub u16);

impl TryFrom<u16> for TransportStatus {
    type Error = UnknownStatus;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(Self::SuccessRead),
            201 => Ok(Self::SuccessWrite),
            400 => Ok(Self::BadRequest),
            403 => Ok(Self::AuthFailure),
            404 => Ok(Self::NotFound),
            500 => Ok(Self::ServerError),
            other => Err(UnknownStatus(other)),
        }
    }
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Failure raised by a controller instead of an outcome.
///
/// Only the `Display` text reaches the caller; the `Debug` form (including
/// any source chain) is logged by the engine.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Failure with a caller-safe message.
    #[error("{0}")]
    Message(String),

    /// A collaborator (persistence, hashing, signing) failed.
    #[error("{service} unavailable: {message}")]
    Unavailable {
        /// Name of the failing collaborator.
        service: &'static str,
        /// Caller-safe detail.
        message: String,
    },

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ControllerError {
    /// Build a plain message failure.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
