//! Gateway publisher for vote-relay.
//!
//! This crate delivers one framed update event to the streaming gateway per
//! call. Each publish:
//!
//! - opens a dedicated WebSocket to `wss://<host>/<path>?access_key=<key>`
//! - fails with a timeout if the socket is not open within the bound
//! - writes `<topic>\n<json>` as a single text message
//! - closes with status 1000 and waits for the socket to go away
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌────────────────────┐
//! │   Controller     │────▶│   Publisher        │
//! │   (function)     │     │   (trait)          │
//! └──────────────────┘     └─────────┬──────────┘
//!                                    │
//!                          ┌─────────▼──────────┐
//!                          │ WsGatewayPublisher │
//!                          │ lifecycle + slot   │
//!                          └─────────┬──────────┘
//!                                    │ WSS
//!                          ┌─────────▼──────────┐
//!                          │  Streaming gateway │
//!                          └────────────────────┘
//! ```
//!
//! The first terminal event of a connection (write success, socket error,
//! timeout, unexpected close) decides the outcome; see [`resolve`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use vote_relay_core::PublishFrame;
//! use vote_relay_publisher::{GatewayEndpoint, Publisher, WsGatewayPublisher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let endpoint = GatewayEndpoint::new(
//!     "wss://gateway.example.com/v0/events",
//!     "access-key",
//!     Duration::from_secs(10),
//! )?;
//! let frame = PublishFrame::new("forum-votes", r#"{"type":"vote_update"}"#)?;
//!
//! WsGatewayPublisher::new().publish(&endpoint, &frame).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod lifecycle;
#[cfg(any(test, feature = "test-utils"))]
pub mod recording;
pub mod resolve;

pub use endpoint::{GatewayEndpoint, DEFAULT_TIMEOUT};
pub use error::{PublishError, Result};
pub use gateway::WsGatewayPublisher;
pub use lifecycle::{CloseOutcome, ConnectionState};
#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingPublisher;

use async_trait::async_trait;
use vote_relay_core::PublishFrame;

/// Delivers publish frames to the gateway.
///
/// This trait abstracts the gateway connection, allowing for recording
/// implementations in tests.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Deliver one frame over a dedicated connection.
    ///
    /// Resolves successfully once the frame has been written; does not wait
    /// for any acknowledgement from the gateway.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Timeout` if the connection is not established
    /// in time, or another `PublishError` for socket-level failures.
    async fn publish(&self, endpoint: &GatewayEndpoint, frame: &PublishFrame) -> Result<()>;
}
