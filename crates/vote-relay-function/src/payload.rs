//! Trigger payload parsing and validation.
//!
//! Parsing and validation are separate steps with separate errors: a body
//! that is not a JSON object is a `PayloadParseError`, while an object with
//! missing or non-string required fields is a `ValidationError`.

use serde::Deserialize;
use serde_json::Value;
use vote_relay_core::{TargetId, VoteTriggerPayload};

use crate::error::{InvocationError, Result};

/// The trigger document as received, before any field is checked.
///
/// Fields stay untyped so a wrong-typed field is reported by [`validate`]
/// alongside missing ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDocument {
    /// Vote document id (`$id` from the store).
    #[serde(alias = "$id")]
    pub id: Option<Value>,
    /// Target the vote was cast against.
    pub target_id: Option<Value>,
    /// Kind of target.
    pub target_type: Option<Value>,
    /// Voting user.
    pub user_id: Option<Value>,
}

/// Parse a raw trigger body.
///
/// # Errors
///
/// Returns `InvocationError::PayloadParse` if the body is absent, blank,
/// not JSON, or not a JSON object.
pub fn parse(body: Option<&str>) -> Result<TriggerDocument> {
    let body = body.map(str::trim).unwrap_or_default();
    if body.is_empty() {
        return Err(InvocationError::PayloadParse(
            "payload is empty".to_string(),
        ));
    }

    serde_json::from_str(body).map_err(|e| InvocationError::PayloadParse(e.to_string()))
}

/// Outcome of checking one required field.
enum Field {
    Present(String),
    Missing,
    NotAString,
}

impl Field {
    fn check(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::String(s)) if s.trim().is_empty() => Self::Missing,
            Some(Value::String(s)) => Self::Present(s),
            Some(_) => Self::NotAString,
        }
    }
}

/// Check that every required field is a present, non-empty string.
///
/// # Errors
///
/// Returns `InvocationError::Validation` listing every missing or
/// non-string field, or describing an unusable `targetId`.
pub fn validate(document: TriggerDocument) -> Result<VoteTriggerPayload> {
    let fields = [
        ("id", Field::check(document.id)),
        ("targetId", Field::check(document.target_id)),
        ("targetType", Field::check(document.target_type)),
        ("userId", Field::check(document.user_id)),
    ];

    let mut missing = Vec::new();
    let mut not_strings = Vec::new();
    let mut values = Vec::with_capacity(fields.len());
    for (name, field) in fields {
        match field {
            Field::Present(value) => values.push(value),
            Field::Missing => missing.push(name),
            Field::NotAString => not_strings.push(name),
        }
    }

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing required field(s): {}", missing.join(", ")));
    }
    if !not_strings.is_empty() {
        problems.push(format!("field(s) must be strings: {}", not_strings.join(", ")));
    }
    if !problems.is_empty() {
        return Err(InvocationError::Validation(problems.join("; ")));
    }

    let [id, target_id, target_type, user_id]: [String; 4] = values
        .try_into()
        .map_err(|_| InvocationError::Validation("incomplete trigger payload".to_string()))?;

    let target_id = TargetId::new(target_id)
        .map_err(|e| InvocationError::Validation(format!("invalid targetId: {e}")))?;

    Ok(VoteTriggerPayload {
        id,
        target_id,
        target_type,
        user_id,
    })
}
