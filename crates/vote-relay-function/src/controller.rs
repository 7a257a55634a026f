//! Invocation controller.
//!
//! Runs one trigger payload through the pipeline:
//!
//! 1. validate configuration
//! 2. parse the payload
//! 3. validate required fields
//! 4. aggregate vote counts
//! 5. build and encode the update event
//! 6. publish the frame
//! 7. report
//!
//! The first failing step ends the invocation; nothing is retried.

use std::sync::Arc;

use tracing::Instrument;
use vote_relay_core::{InvocationId, PublishFrame, TargetId, UpdateEvent, VoteCounts};
use vote_relay_publisher::Publisher;
use vote_relay_store::VoteStore;

use crate::aggregator::VoteAggregator;
use crate::config::RelaySettings;
use crate::error::Result;
use crate::payload;
use crate::response::InvocationResponse;

/// What a successful invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationReport {
    /// The invocation that produced this report.
    pub invocation_id: InvocationId,
    /// The target whose counts were published.
    pub target_id: TargetId,
    /// The published counts.
    pub counts: VoteCounts,
    /// The topic the frame went to.
    pub topic: String,
}

impl InvocationReport {
    /// One-line summary for the response message.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "published vote counts for {} to {}: upvotes={} downvotes={} score={}",
            self.target_id,
            self.topic,
            self.counts.upvotes(),
            self.counts.downvotes(),
            self.counts.score()
        )
    }
}

/// Where an invocation gets its settings from.
#[derive(Debug, Clone)]
enum SettingsSource {
    /// The process environment, read again for every invocation.
    Environment,
    /// A fixed set of settings.
    Fixed(RelaySettings),
}

impl SettingsSource {
    fn load(&self) -> RelaySettings {
        match self {
            Self::Environment => RelaySettings::from_env(),
            Self::Fixed(settings) => settings.clone(),
        }
    }
}

/// Drives invocations against a vote store and a gateway publisher.
pub struct InvocationController<S: VoteStore, P: Publisher> {
    settings: SettingsSource,
    store: Arc<S>,
    publisher: Arc<P>,
}

impl<S: VoteStore, P: Publisher> InvocationController<S, P> {
    /// Create a controller that reads the environment at the start of every
    /// invocation.
    #[must_use]
    pub fn from_env(store: Arc<S>, publisher: Arc<P>) -> Self {
        Self {
            settings: SettingsSource::Environment,
            store,
            publisher,
        }
    }

    /// Create a controller with fixed settings.
    ///
    /// `settings` are validated on every invocation, not here.
    #[must_use]
    pub fn new(settings: RelaySettings, store: Arc<S>, publisher: Arc<P>) -> Self {
        Self {
            settings: SettingsSource::Fixed(settings),
            store,
            publisher,
        }
    }

    /// Run one invocation for a raw trigger body.
    ///
    /// # Errors
    ///
    /// Returns the `InvocationError` of the first step that failed.
    pub async fn invoke(&self, body: Option<&str>) -> Result<InvocationReport> {
        let invocation_id = InvocationId::generate();
        let span = tracing::info_span!("invocation", invocation_id = %invocation_id);

        self.run(invocation_id, body).instrument(span).await
    }

    /// Run one invocation and render the response contract.
    ///
    /// Returns the HTTP status alongside the response body.
    pub async fn handle(&self, body: Option<&str>) -> (u16, InvocationResponse) {
        match self.invoke(body).await {
            Ok(report) => (200, InvocationResponse::success(report.summary())),
            Err(err) => (err.http_status_code(), InvocationResponse::failure(&err)),
        }
    }

    async fn run(&self, invocation_id: InvocationId, body: Option<&str>) -> Result<InvocationReport> {
        let result = self.pipeline(invocation_id, body).await;

        match &result {
            Ok(report) => tracing::info!(
                target_id = %report.target_id,
                score = %report.counts.score(),
                "Invocation succeeded"
            ),
            Err(err) if err.is_client_error() => {
                tracing::warn!(kind = err.kind(), error = %err, "Invocation rejected");
            }
            Err(err) => tracing::error!(kind = err.kind(), error = %err, "Invocation failed"),
        }

        result
    }

    async fn pipeline(
        &self,
        invocation_id: InvocationId,
        body: Option<&str>,
    ) -> Result<InvocationReport> {
        let config = self.settings.load().validate()?;

        let document = payload::parse(body)?;
        let trigger = payload::validate(document)?;
        tracing::debug!(
            vote_id = %trigger.id,
            target_id = %trigger.target_id,
            target_type = %trigger.target_type,
            user_id = %trigger.user_id,
            "Trigger accepted"
        );

        let counts = VoteAggregator::new(self.store.as_ref(), &config.store)
            .compute_counts(&trigger.target_id)
            .await?;

        let event = UpdateEvent::vote_update(trigger.target_id.clone(), trigger.target_type, counts);
        let frame = PublishFrame::for_event(&config.topic, &event)?;

        tracing::debug!(
            gateway = %config.gateway.redacted(),
            topic = frame.topic(),
            bytes = frame.len(),
            "Publishing update event"
        );
        self.publisher.publish(&config.gateway, &frame).await?;

        Ok(InvocationReport {
            invocation_id,
            target_id: trigger.target_id,
            counts,
            topic: config.topic,
        })
    }
}
