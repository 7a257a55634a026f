//! Core types and utilities for vote-relay.
//!
//! This crate provides the foundational types used throughout the vote-relay
//! pipeline:
//!
//! - **Identifiers**: non-empty target IDs and per-invocation IDs
//! - **Data model**: trigger payloads, vote counts and update events
//! - **Encoding**: canonical event JSON and `<topic>\n<json>` publish frames
//!
//! # Example
//!
//! ```
//! use vote_relay_core::{PublishFrame, TargetId, UpdateEvent, VoteCounts};
//!
//! let event = UpdateEvent::vote_update(
//!     TargetId::new("post42").unwrap(),
//!     "post",
//!     VoteCounts::new(3, 1),
//! );
//!
//! let frame = PublishFrame::for_event("forum-votes", &event).unwrap();
//! assert_eq!(frame.topic(), "forum-votes");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod encode;
pub mod error;
pub mod ids;
pub mod types;

pub use encode::{decode, encode, validate_topic, PublishFrame};
pub use error::{CoreError, Result};
pub use ids::{IdError, InvocationId, TargetId};
pub use types::{EventKind, UpdateEvent, VoteCounts, VoteTriggerPayload, VoteType};
