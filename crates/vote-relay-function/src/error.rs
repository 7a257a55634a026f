//! Error types for the invocation pipeline.
//!
//! Every step of an invocation fails fast with one of these errors. The
//! variant names the step that failed and carries the cause verbatim.

use std::time::Duration;

use thiserror::Error;
use vote_relay_core::{CoreError, TargetId};
use vote_relay_publisher::PublishError;
use vote_relay_store::StoreError;

/// A result type using `InvocationError`.
pub type Result<T> = std::result::Result<T, InvocationError>;

/// Problems found while validating the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variables that are unset or blank.
    #[error("missing required variable(s): {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// A variable that is set but unusable.
    #[error("invalid {variable}: {reason}")]
    Invalid {
        /// The offending variable.
        variable: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Counting votes for a target failed.
#[derive(Debug, Error)]
#[error("failed to count {vote_type}votes for target {target_id}: {source}")]
pub struct AggregationError {
    /// The target whose votes were being counted.
    pub target_id: TargetId,
    /// Which count failed (`up` or `down`).
    pub vote_type: &'static str,
    /// The store failure.
    #[source]
    pub source: StoreError,
}

/// Errors that end an invocation.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Store or gateway settings are absent or malformed.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The trigger payload is absent, empty, or not a JSON object.
    #[error("invalid trigger payload: {0}")]
    PayloadParse(String),

    /// Required payload fields are missing or unusable.
    #[error("{0}")]
    Validation(String),

    /// The store could not produce vote counts.
    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    /// The update event could not be encoded or framed.
    #[error(transparent)]
    Encoding(#[from] CoreError),

    /// The gateway socket failed.
    #[error("gateway publish failed: {0}")]
    Transport(#[source] PublishError),

    /// The gateway socket did not open in time.
    #[error("gateway connection not established within {}ms", .0.as_millis())]
    TransportTimeout(Duration),
}

impl InvocationError {
    /// The taxonomy name reported to callers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::PayloadParse(_) => "PayloadParseError",
            Self::Validation(_) => "ValidationError",
            Self::Aggregation(_) => "AggregationError",
            Self::Encoding(_) => "EncodingError",
            Self::Transport(_) => "TransportError",
            Self::TransportTimeout(_) => "TransportTimeoutError",
        }
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::PayloadParse(_) | Self::Validation(_) => 400,
            Self::Configuration(_)
            | Self::Aggregation(_)
            | Self::Encoding(_)
            | Self::Transport(_)
            | Self::TransportTimeout(_) => 500,
        }
    }

    /// Returns true if the trigger payload is at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::PayloadParse(_) | Self::Validation(_))
    }
}

impl From<PublishError> for InvocationError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::Timeout(after) => Self::TransportTimeout(after),
            other => Self::Transport(other),
        }
    }
}
