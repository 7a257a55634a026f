//! In-memory vote store for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};

use vote_relay_core::{TargetId, VoteType};

use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::{StoreLocation, VoteStore};

/// A vote store holding documents in memory.
///
/// Evaluates `equal` queries over the stored documents and ignores `limit`
/// when computing totals, like the real store. Individual queries can be
/// made to fail to simulate network errors.
#[derive(Debug, Default)]
pub struct MemoryVoteStore {
    documents: RwLock<Vec<Value>>,
    failures: RwLock<Vec<Query>>,
    calls: AtomicUsize,
}

impl MemoryVoteStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `count` votes of one direction for a target.
    pub fn insert_votes(&self, target_id: &TargetId, vote_type: VoteType, count: usize) {
        let mut documents = self.documents.write();
        for _ in 0..count {
            let n = documents.len();
            documents.push(json!({
                "$id": format!("vote-{n}"),
                "targetId": target_id.as_str(),
                "voteType": vote_type.as_str(),
                "userId": format!("user-{n}"),
            }));
        }
    }

    /// Fail every count whose queries include `query`.
    pub fn fail_on(&self, query: Query) {
        self.failures.write().push(query);
    }

    /// Number of count calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoteStore for MemoryVoteStore {
    async fn count(&self, _location: &StoreLocation, queries: &[Query]) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failures.read().iter().any(|f| queries.contains(f)) {
            return Err(StoreError::Request("connection reset by peer".to_string()));
        }

        let total = self
            .documents
            .read()
            .iter()
            .filter(|doc| queries.iter().all(|q| q.matches(doc)))
            .count();
        Ok(total as u64)
    }
}
