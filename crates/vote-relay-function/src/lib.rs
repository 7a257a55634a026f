//! Vote aggregation and publish function for vote-relay.
//!
//! Each invocation receives the vote document that was just written,
//! recounts the target's votes in the store, and publishes the fresh totals
//! to the streaming gateway as a single framed event.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Trigger (HTTP POST / test)                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   InvocationController                      │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │   Config    │ │  Payload    │ │   VoteAggregator    │    │
//! │  │  Validation │ │  Parsing    │ │   (2 counts, join)  │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//!        ┌──────────────┐              ┌──────────────┐
//!        │  VoteStore   │              │  Publisher   │
//!        │  (REST)      │              │  (WSS)       │
//!        └──────────────┘              └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use vote_relay_function::InvocationController;
//! use vote_relay_publisher::WsGatewayPublisher;
//! use vote_relay_store::HttpDocumentStore;
//!
//! # async fn example() {
//! let controller = InvocationController::from_env(
//!     Arc::new(HttpDocumentStore::new()),
//!     Arc::new(WsGatewayPublisher::new()),
//! );
//!
//! let body = r#"{"$id":"v1","targetId":"post42","targetType":"post","userId":"u7"}"#;
//! let (status, response) = controller.handle(Some(body)).await;
//! println!("{status}: {}", serde_json::to_string(&response).unwrap());
//! # }
//! ```
//!
//! # Failure Handling
//!
//! Every step fails fast. Payload and validation problems answer `400`;
//! configuration, store, encoding and gateway problems answer `500`. See
//! [`InvocationError`] for the taxonomy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod aggregator;
pub mod config;
pub mod controller;
pub mod error;
pub mod payload;
pub mod response;
pub mod server;

pub use aggregator::VoteAggregator;
pub use config::{RelayConfig, RelaySettings, DEFAULT_TOPIC};
pub use controller::{InvocationController, InvocationReport};
pub use error::{AggregationError, ConfigError, InvocationError, Result};
pub use response::InvocationResponse;
pub use server::{create_router, HealthResponse};
