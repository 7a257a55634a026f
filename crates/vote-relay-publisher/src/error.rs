//! Error types for gateway publishing.

use std::time::Duration;

use thiserror::Error;

use crate::lifecycle::ConnectionState;

/// A result type using `PublishError`.
pub type Result<T> = std::result::Result<T, PublishError>;

/// Errors that can occur while publishing a frame to the gateway.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// The gateway URL or credential could not be turned into a request.
    #[error("invalid gateway endpoint: {0}")]
    InvalidEndpoint(String),

    /// The socket did not open within the timeout bound.
    #[error("gateway connection not established within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// A socket-level failure.
    #[error("gateway transport error: {0}")]
    Transport(String),

    /// The gateway closed the socket with an unexpected status code.
    #[error("gateway closed connection with unexpected code {code}: {reason}")]
    UnexpectedClose {
        /// WebSocket close status code.
        code: u16,
        /// Close reason sent by the gateway.
        reason: String,
    },

    /// The connection state machine was driven out of order.
    #[error("invalid connection transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// The current state.
        from: ConnectionState,
        /// The requested state.
        to: ConnectionState,
    },
}

impl PublishError {
    /// Returns `true` if the socket never opened within the bound.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for PublishError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
