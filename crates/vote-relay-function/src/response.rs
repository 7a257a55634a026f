//! The response contract returned for every invocation.

use serde::{Deserialize, Serialize};

use crate::error::InvocationError;

/// `{ success, message?, error? }` as seen by the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    /// Whether the update event was published.
    pub success: bool,
    /// Human-readable summary on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error kind and cause on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvocationResponse {
    /// A successful response.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A failed response describing `err` as `<kind>: <cause>`.
    #[must_use]
    pub fn failure(err: &InvocationError) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(format!("{}: {err}", err.kind())),
        }
    }
}
