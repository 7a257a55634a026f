//! Vote aggregation.

use vote_relay_core::{TargetId, VoteCounts, VoteType};
use vote_relay_store::{Query, StoreLocation, VoteStore};

use crate::error::AggregationError;

/// Attribute holding the voted target.
pub const TARGET_ID_ATTRIBUTE: &str = "targetId";

/// Attribute holding the vote direction.
pub const VOTE_TYPE_ATTRIBUTE: &str = "voteType";

/// Computes vote counts for a target from the store.
pub struct VoteAggregator<'a, S: VoteStore + ?Sized> {
    store: &'a S,
    location: &'a StoreLocation,
}

impl<'a, S: VoteStore + ?Sized> VoteAggregator<'a, S> {
    /// Create an aggregator over one votes collection.
    pub const fn new(store: &'a S, location: &'a StoreLocation) -> Self {
        Self { store, location }
    }

    /// Count upvotes and downvotes for `target_id`.
    ///
    /// Both counts are queried concurrently; either failing fails the whole
    /// aggregation.
    ///
    /// # Errors
    ///
    /// Returns `AggregationError` naming the target and the failed count.
    pub async fn compute_counts(
        &self,
        target_id: &TargetId,
    ) -> Result<VoteCounts, AggregationError> {
        let (upvotes, downvotes) = tokio::try_join!(
            self.count(target_id, VoteType::Up),
            self.count(target_id, VoteType::Down),
        )?;

        let counts = VoteCounts::new(upvotes, downvotes);
        tracing::debug!(
            target_id = %target_id,
            upvotes = counts.upvotes(),
            downvotes = counts.downvotes(),
            score = %counts.score(),
            "Aggregated votes"
        );
        Ok(counts)
    }

    async fn count(
        &self,
        target_id: &TargetId,
        vote_type: VoteType,
    ) -> Result<u64, AggregationError> {
        let queries = [
            Query::equal(TARGET_ID_ATTRIBUTE, target_id.as_str()),
            Query::equal(VOTE_TYPE_ATTRIBUTE, vote_type.as_str()),
            Query::limit(1),
        ];

        self.store
            .count(self.location, &queries)
            .await
            .map_err(|source| AggregationError {
                target_id: target_id.clone(),
                vote_type: vote_type.as_str(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use vote_relay_store::MemoryVoteStore;

    use super::*;

    fn location() -> StoreLocation {
        StoreLocation {
            endpoint: "https://cloud.example.com/v1".to_string(),
            project_id: "forum".to_string(),
            api_key: "secret".to_string(),
            database_id: "main".to_string(),
            collection_id: "votes".to_string(),
        }
    }

    #[tokio::test]
    async fn counts_each_direction() {
        let store = MemoryVoteStore::new();
        let post = TargetId::new("post42").unwrap();
        let other = TargetId::new("post7").unwrap();
        store.insert_votes(&post, VoteType::Up, 3);
        store.insert_votes(&post, VoteType::Down, 1);
        store.insert_votes(&other, VoteType::Down, 5);

        let location = location();
        let counts = VoteAggregator::new(&store, &location)
            .compute_counts(&post)
            .await
            .unwrap();

        assert_eq!(counts, VoteCounts::new(3, 1));
        assert_eq!(counts.score(), 2);
        assert_eq!(store.call_count(), 2);
    }

    #[tokio::test]
    async fn no_votes_is_zero() {
        let store = MemoryVoteStore::new();
        let location = location();
        let counts = VoteAggregator::new(&store, &location)
            .compute_counts(&TargetId::new("fresh").unwrap())
            .await
            .unwrap();
        assert_eq!(counts, VoteCounts::new(0, 0));
    }

    #[tokio::test]
    async fn more_downvotes_gives_negative_score() {
        let store = MemoryVoteStore::new();
        let target = TargetId::new("c1").unwrap();
        store.insert_votes(&target, VoteType::Up, 1);
        store.insert_votes(&target, VoteType::Down, 4);

        let location = location();
        let counts = VoteAggregator::new(&store, &location)
            .compute_counts(&target)
            .await
            .unwrap();
        assert_eq!(counts.score(), -3);
    }

    #[tokio::test]
    async fn failed_downvote_count_fails_aggregation() {
        let store = MemoryVoteStore::new();
        let target = TargetId::new("post42").unwrap();
        store.insert_votes(&target, VoteType::Up, 3);
        store.fail_on(Query::equal(VOTE_TYPE_ATTRIBUTE, "down"));

        let location = location();
        let err = VoteAggregator::new(&store, &location)
            .compute_counts(&target)
            .await
            .unwrap_err();

        assert_eq!(err.target_id, target);
        assert_eq!(err.vote_type, "down");
        assert!(err.source.is_network());
    }
}
