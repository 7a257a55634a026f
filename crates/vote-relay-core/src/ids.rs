//! Strongly-typed identifiers for vote-relay.
//!
//! - [`TargetId`]: the forum entity (post, comment) votes are cast against.
//!   Always non-empty.
//! - [`InvocationId`]: a random UUID tagging one run of the pipeline in logs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty or whitespace-only.
    #[error("identifier must not be empty")]
    Empty,

    /// The identifier contains a control character.
    #[error("identifier contains a control character")]
    ControlCharacter,

    /// The string is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,
}

/// Identifier of a vote target.
///
/// Guaranteed non-empty and free of control characters, so it can be used
/// verbatim in store queries and in the published event.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetId(String);

impl TargetId {
    /// Create a `TargetId`, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` for an empty or whitespace-only string and
    /// `IdError::ControlCharacter` if the value contains control characters.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdError::Empty);
        }
        if value.chars().any(char::is_control) {
            return Err(IdError::ControlCharacter);
        }
        Ok(Self(value))
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TargetId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TargetId({})", self.0)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TargetId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TargetId> for String {
    fn from(id: TargetId) -> Self {
        id.0
    }
}

impl AsRef<str> for TargetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a single pipeline invocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvocationId(uuid::Uuid);

impl InvocationId {
    /// Generate a new random `InvocationId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Return the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl FromStr for InvocationId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvocationId({})", self.0)
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for InvocationId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InvocationId> for String {
    fn from(id: InvocationId) -> Self {
        id.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_id_accepts_plain_value() {
        let id = TargetId::new("post42").unwrap();
        assert_eq!(id.as_str(), "post42");
        assert_eq!(id.to_string(), "post42");
    }

    #[test]
    fn target_id_rejects_empty() {
        assert_eq!(TargetId::new(""), Err(IdError::Empty));
        assert_eq!(TargetId::new("   "), Err(IdError::Empty));
    }

    #[test]
    fn target_id_rejects_control_characters() {
        assert_eq!(TargetId::new("post\n42"), Err(IdError::ControlCharacter));
    }

    #[test]
    fn target_id_serde_is_plain_string() {
        let id = TargetId::new("comment-7").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"comment-7\"");

        let parsed: TargetId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);

        assert!(serde_json::from_str::<TargetId>("\"\"").is_err());
    }

    #[test]
    fn invocation_ids_are_unique() {
        let a = InvocationId::generate();
        let b = InvocationId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn invocation_id_parse() {
        let id = InvocationId::generate();
        let parsed = InvocationId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(
            InvocationId::from_str("not-a-uuid"),
            Err(IdError::InvalidUuid)
        );
    }
}
