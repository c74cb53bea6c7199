use crate::{models::access::DenyReason, services::storage_backend::BackendError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::{fmt, string::FromUtf8Error};
use thiserror::Error;

/// Every way a single gateway invocation can fail.
///
/// The gateway converts each variant into a response envelope; none of them
/// escape to the trigger.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("access to `{key}` denied: {reason}")]
    Denied { key: String, reason: DenyReason },
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error("no content type configured for `{key}`")]
    UnsupportedType { key: String },
    #[error("object `{key}` is not valid UTF-8 text")]
    Undecodable {
        key: String,
        #[source]
        source: FromUtf8Error,
    },
    #[error("backend failure while fetching `{key}`")]
    Backend {
        key: String,
        #[source]
        source: BackendError,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Denied { .. } => StatusCode::FORBIDDEN,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::UnsupportedType { .. }
            | GatewayError::Undecodable { .. }
            | GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code placed in response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Denied { .. } => "Denied",
            GatewayError::NotFound(_) => "NotFound",
            GatewayError::UnsupportedType { .. } | GatewayError::Undecodable { .. } => {
                "UnsupportedType"
            }
            GatewayError::Backend { .. } => "BackendError",
            GatewayError::InvalidRequest(_) => "InvalidRequest",
        }
    }

    /// Key the failure concerns, when one was derived.
    pub fn key(&self) -> Option<&str> {
        match self {
            GatewayError::Denied { key, .. }
            | GatewayError::UnsupportedType { key }
            | GatewayError::Undecodable { key, .. }
            | GatewayError::Backend { key, .. } => Some(key),
            GatewayError::NotFound(key) => Some(key),
            GatewayError::InvalidRequest(_) => None,
        }
    }

    /// Text safe to show a client. Backend failures stay opaque; the
    /// underlying error is only logged.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Backend { .. } => "failed to read object from storage".to_string(),
            other => other.to_string(),
        }
    }
}

/// A lightweight wrapper for failures of the HTTP surface itself, such as an
/// unparseable trigger event.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io, time::Duration};

    #[test]
    fn statuses_follow_taxonomy() {
        let denied = GatewayError::Denied {
            key: "../etc/passwd".into(),
            reason: DenyReason::Traversal,
        };
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            GatewayError::NotFound("a.exe".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::UnsupportedType {
                key: "report.pdf".into()
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::InvalidRequest("empty".into()).code(),
            "InvalidRequest"
        );
    }

    #[test]
    fn backend_message_hides_underlying_error() {
        let err = GatewayError::Backend {
            key: "downloads/app.exe".into(),
            source: BackendError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "/srv/secret/root/downloads/app.exe: permission denied",
            )),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.key(), Some("downloads/app.exe"));
        assert!(!err.public_message().contains("/srv/secret"));

        let timeout = GatewayError::Backend {
            key: "k.zip".into(),
            source: BackendError::Timeout(Duration::from_secs(1)),
        };
        assert_eq!(timeout.code(), "BackendError");
    }
}
