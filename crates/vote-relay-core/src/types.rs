//! Vote data model.
//!
//! These types describe the trigger payload delivered by the data store, the
//! aggregated counts, and the event published to the gateway. Field names on
//! the wire are camelCase.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::TargetId;

/// Direction of a single vote, as stored in the `voteType` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    /// An upvote.
    Up,
    /// A downvote.
    Down,
}

impl VoteType {
    /// The attribute value used by the vote store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated vote document that triggered an invocation.
///
/// The store names the document identifier `$id`; `id` is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTriggerPayload {
    /// Identifier of the vote document.
    #[serde(alias = "$id")]
    pub id: String,
    /// The entity the vote was cast against.
    pub target_id: TargetId,
    /// Kind of target (`post`, `comment`, ...).
    pub target_type: String,
    /// The voting user.
    pub user_id: String,
}

/// Aggregated vote totals for one target.
///
/// `score` is always `upvotes - downvotes`: the only constructor is
/// [`VoteCounts::new`], and deserialization rejects a mismatching score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVoteCounts")]
pub struct VoteCounts {
    upvotes: u64,
    downvotes: u64,
    score: i128,
}

/// Wire shape of `VoteCounts` before the score is checked.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVoteCounts {
    upvotes: u64,
    downvotes: u64,
    score: i128,
}

impl VoteCounts {
    /// Build counts from the two totals, deriving the score.
    #[must_use]
    pub fn new(upvotes: u64, downvotes: u64) -> Self {
        Self {
            upvotes,
            downvotes,
            score: Self::derive_score(upvotes, downvotes),
        }
    }

    /// Number of upvotes.
    #[must_use]
    pub const fn upvotes(&self) -> u64 {
        self.upvotes
    }

    /// Number of downvotes.
    #[must_use]
    pub const fn downvotes(&self) -> u64 {
        self.downvotes
    }

    /// Net score (`upvotes - downvotes`).
    ///
    /// Wide enough to hold the exact difference of any two `u64` totals.
    #[must_use]
    pub const fn score(&self) -> i128 {
        self.score
    }

    fn derive_score(upvotes: u64, downvotes: u64) -> i128 {
        i128::from(upvotes) - i128::from(downvotes)
    }
}

impl TryFrom<RawVoteCounts> for VoteCounts {
    type Error = CoreError;

    fn try_from(raw: RawVoteCounts) -> Result<Self, Self::Error> {
        let counts = Self::new(raw.upvotes, raw.downvotes);
        if counts.score == raw.score {
            Ok(counts)
        } else {
            Err(CoreError::InconsistentScore {
                upvotes: raw.upvotes,
                downvotes: raw.downvotes,
                score: raw.score,
            })
        }
    }
}

/// Discriminator of the published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Vote totals for a target changed.
    #[serde(rename = "vote_update")]
    VoteUpdate,
}

/// The event published to the gateway after a vote changes.
///
/// Serializes as
/// `{"type":"vote_update","targetId":..,"targetType":..,"voteCounts":{..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateEvent {
    /// Always [`EventKind::VoteUpdate`].
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// The target whose totals changed.
    pub target_id: TargetId,
    /// Kind of target.
    pub target_type: String,
    /// Freshly computed totals.
    pub vote_counts: VoteCounts,
}

impl UpdateEvent {
    /// Build a `vote_update` event for a target.
    #[must_use]
    pub fn vote_update(
        target_id: TargetId,
        target_type: impl Into<String>,
        vote_counts: VoteCounts,
    ) -> Self {
        Self {
            kind: EventKind::VoteUpdate,
            target_id,
            target_type: target_type.into(),
            vote_counts,
        }
    }
}
