//! Machine-readable failure kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a failed request, carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No caller identity was presented.
    Unauthenticated,
    /// The action requires a binding that does not exist.
    Unauthorized,
    /// The resource is bound to a different identity.
    Conflict,
    /// A remote controller could not be reached or answered unexpectedly.
    DelegationFailure,
    /// The requested action name is not recognised by this resource.
    InvalidAction,
    /// The device behind the resource failed to carry out the action.
    DeviceFailure,
    /// Storage or other internal failure.
    Internal,
}

impl ErrorKind {
    /// Canonical HTTP status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Unauthenticated | Self::Unauthorized => 401,
            Self::Conflict => 409,
            Self::InvalidAction => 400,
            Self::DelegationFailure | Self::DeviceFailure => 502,
            Self::Internal => 500,
        }
    }

    /// Stable snake_case label, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Unauthorized => "unauthorized",
            Self::Conflict => "conflict",
            Self::DelegationFailure => "delegation_failure",
            Self::InvalidAction => "invalid_action",
            Self::DeviceFailure => "device_failure",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
