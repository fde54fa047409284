//! Unified error handling for bindery.
//!
//! Every request-facing failure is an [`AccessError`]. Each variant maps to
//! one protocol [`ErrorKind`], which fixes the HTTP status code and the
//! `kind` field of the JSON error body. `error_code()` doubles as the
//! metric label.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bindery_proto::{ErrorBody, ErrorKind};
use thiserror::Error;

use crate::delegation::DelegationFault;
use crate::device::DeviceError;
use crate::store::StoreError;

// ============================================================================
// Access Errors (request admission and action execution)
// ============================================================================

/// Errors returned to callers of the controller.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Authentication Failed.")]
    Unauthenticated,

    #[error("Resource not bound.")]
    Unauthorized,

    #[error("Resource bound to another user.")]
    Conflict,

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Delegation failed: {0}")]
    Delegation(#[from] DelegationFault),

    #[error("Device failure: {0}")]
    Device(DeviceError),

    #[error("Binding store failure: {0}")]
    Store(#[from] StoreError),
}

impl AccessError {
    /// Protocol kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Conflict => ErrorKind::Conflict,
            Self::InvalidAction(_) => ErrorKind::InvalidAction,
            Self::Delegation(_) => ErrorKind::DelegationFailure,
            Self::Device(_) => ErrorKind::DeviceFailure,
            Self::Store(_) => ErrorKind::Internal,
        }
    }

    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        self.kind().as_str()
    }
}

impl From<DeviceError> for AccessError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::UnknownAction(action) => Self::InvalidAction(action),
            other => Self::Device(other),
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if kind == ErrorKind::Internal {
            tracing::error!(error = %self, "Request failed with internal error");
        }
        let status =
            StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody::new(kind, self.to_string()))).into_response()
    }
}

/// Result type for request handlers.
pub type AccessResult<T> = Result<T, AccessError>;
