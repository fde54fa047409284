//! Caller identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced when parsing a caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallerIdError {
    /// The identity was empty or whitespace only.
    #[error("caller identity is empty")]
    Empty,
}

/// An opaque caller identity, used as the ownership key of a binding.
///
/// Identities are compared byte-for-byte. Surrounding whitespace is
/// trimmed; an identity that is empty after trimming does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(String);

impl CallerId {
    /// Parse an identity from a raw header value.
    pub fn parse(raw: &str) -> Result<Self, CallerIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CallerIdError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the identity as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identity, returning the owned string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CallerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CallerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CallerId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::str::FromStr for CallerId {
    type Err = CallerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
