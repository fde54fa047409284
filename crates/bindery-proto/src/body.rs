//! JSON response bodies.

use crate::{CallerId, ErrorKind};
use serde::{Deserialize, Serialize};

/// Reply to a status query: whether the resource is bound, and to whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingStatus {
    /// `true` when an owner is recorded.
    pub bound: bool,
    /// The current owner, `null` when the resource is free.
    pub owner_id: Option<String>,
}

impl BindingStatus {
    /// Status of a free resource.
    pub fn free() -> Self {
        Self {
            bound: false,
            owner_id: None,
        }
    }

    /// Status of a resource bound to `owner`.
    pub fn bound_to(owner: &CallerId) -> Self {
        Self {
            bound: true,
            owner_id: Some(owner.as_str().to_string()),
        }
    }
}

/// Reply to a successful bind or unbind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerBody {
    /// The new owner (bind) or the vacated owner (unbind).
    pub owner_id: String,
}

impl From<&CallerId> for OwnerBody {
    fn from(owner: &CallerId) -> Self {
        Self {
            owner_id: owner.as_str().to_string(),
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Machine-readable failure kind.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub error_message: String,
}

impl ErrorBody {
    /// Build an error body.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            error_message: message.into(),
        }
    }
}
