//! A publisher that records frames instead of opening sockets.

use async_trait::async_trait;
use parking_lot::Mutex;

use vote_relay_core::PublishFrame;

use crate::endpoint::GatewayEndpoint;
use crate::error::{PublishError, Result};
use crate::Publisher;

/// A publisher for testing that keeps every frame it is asked to send.
///
/// Configure [`RecordingPublisher::fail_with`] to make every publish fail.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    frames: Mutex<Vec<(String, PublishFrame)>>,
    failure: Mutex<Option<PublishError>>,
}

impl RecordingPublisher {
    /// Create a publisher that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent publish fail with `err`.
    pub fn fail_with(&self, err: PublishError) {
        *self.failure.lock() = Some(err);
    }

    /// Frames published so far, with the redacted endpoint they went to.
    #[must_use]
    pub fn frames(&self) -> Vec<(String, PublishFrame)> {
        self.frames.lock().clone()
    }

    /// Number of publish attempts, failed ones included.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.frames.lock().len()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, endpoint: &GatewayEndpoint, frame: &PublishFrame) -> Result<()> {
        self.frames
            .lock()
            .push((endpoint.redacted(), frame.clone()));

        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
