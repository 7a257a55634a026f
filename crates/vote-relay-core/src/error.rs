//! Common error types for vote-relay.
//!
//! This module provides the errors raised while building, encoding and
//! framing vote update events.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the core vote types and the event encoder.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The update event could not be serialized.
    #[error("failed to encode update event: {0}")]
    Encoding(#[source] serde_json::Error),

    /// A JSON document is not a valid update event.
    #[error("failed to decode update event: {0}")]
    Decoding(#[source] serde_json::Error),

    /// A vote count triple whose score is not `upvotes - downvotes`.
    #[error("inconsistent vote counts: score {score} != {upvotes} - {downvotes}")]
    InconsistentScore {
        /// Reported upvotes.
        upvotes: u64,
        /// Reported downvotes.
        downvotes: u64,
        /// Reported score.
        score: i128,
    },

    /// A publish topic that cannot be framed.
    #[error("invalid topic {topic:?}: {reason}")]
    InvalidTopic {
        /// The rejected topic.
        topic: String,
        /// Why the topic was rejected.
        reason: &'static str,
    },
}
