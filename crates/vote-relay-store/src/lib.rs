//! Document store access for vote-relay.
//!
//! Votes live in a remote document store. The pipeline only ever asks one
//! question of it: how many documents match these filters? The answer comes
//! from the store-reported `total`, so a query capped at one row still yields
//! the true count.
//!
//! # Example
//!
//! ```no_run
//! use vote_relay_store::{HttpDocumentStore, Query, StoreLocation, VoteStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = HttpDocumentStore::new();
//! let location = StoreLocation {
//!     endpoint: "https://cloud.example.com/v1".to_string(),
//!     project_id: "forum".to_string(),
//!     api_key: "secret".to_string(),
//!     database_id: "main".to_string(),
//!     collection_id: "votes".to_string(),
//! };
//!
//! let upvotes = store
//!     .count(
//!         &location,
//!         &[
//!             Query::equal("targetId", "post42"),
//!             Query::equal("voteType", "up"),
//!             Query::limit(1),
//!         ],
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod query;

pub use error::{Result, StoreError};
pub use http::HttpDocumentStore;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryVoteStore;
pub use query::Query;

use async_trait::async_trait;

/// Where the votes collection lives and how to authenticate against it.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreLocation {
    /// Base URL of the store API (e.g. `https://cloud.example.com/v1`).
    pub endpoint: String,
    /// Project the database belongs to.
    pub project_id: String,
    /// API key with read access to the collection.
    pub api_key: String,
    /// Database identifier.
    pub database_id: String,
    /// Votes collection identifier.
    pub collection_id: String,
}

impl StoreLocation {
    /// URL of the collection's document listing endpoint.
    #[must_use]
    pub fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint.trim_end_matches('/'),
            self.database_id,
            self.collection_id
        )
    }
}

impl std::fmt::Debug for StoreLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreLocation")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &"<redacted>")
            .field("database_id", &self.database_id)
            .field("collection_id", &self.collection_id)
            .finish()
    }
}

/// Count queries against the vote store.
///
/// This trait abstracts the store client, allowing for in-memory
/// implementations in tests.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Count the documents matching every query.
    ///
    /// Returns the store-reported total, independent of any `limit` query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the store rejects it.
    async fn count(&self, location: &StoreLocation, queries: &[Query]) -> Result<u64>;
}
