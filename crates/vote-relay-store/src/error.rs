//! Error types for the document store client.

use thiserror::Error;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while querying the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a response (connect, timeout, I/O).
    #[error("store request failed: {0}")]
    Request(String),

    /// The store answered with a non-success status.
    #[error("store returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message reported by the store, or the status text.
        message: String,
    },

    /// The response body could not be understood.
    #[error("invalid store response: {0}")]
    InvalidResponse(String),

    /// A query could not be serialized.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl StoreError {
    /// Returns `true` if no response was received from the store.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}
