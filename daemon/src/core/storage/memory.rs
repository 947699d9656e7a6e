use async_trait::async_trait;
use indexmap::IndexMap;
use log::debug;
use tokio::sync::RwLock;

use prizepool_common::{
    round::{RoundId, RoundRecord},
    time::TimestampSeconds,
};

use super::{RoundStore, StorageError};

/// In-memory store, records are kept in insertion order
#[derive(Default)]
pub struct MemoryRoundStore {
    records: RwLock<IndexMap<RoundId, RoundRecord>>,
}

impl MemoryRoundStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoundStore for MemoryRoundStore {
    async fn record(&self, record: RoundRecord) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        let id = record.id();
        if records.contains_key(&id) {
            return Err(StorageError::AlreadyRecorded(id));
        }

        debug!("Recording round {} as {}", id, record.status());
        records.insert(id, record);
        Ok(())
    }

    async fn get(&self, id: RoundId) -> Result<Option<RoundRecord>, StorageError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn history(
        &self,
        address: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RoundRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .rev()
            .filter(|record| address.map_or(true, |address| record.has_participant(address)))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn prune_before(&self, cutoff: TimestampSeconds) -> Result<usize, StorageError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.finished_at() >= cutoff);
        Ok(before - records.len())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prizepool_common::{
        config::COIN_VALUE,
        round::{CancelReason, CancelledRound, CreateRoundParams, OpenRound},
    };

    fn cancelled(id: RoundId, creator: &str, cancelled_at: TimestampSeconds) -> RoundRecord {
        let params = CreateRoundParams::capacity_locked(creator, COIN_VALUE, 3);
        let round = OpenRound::new(id, params, 500, 0).unwrap();
        CancelledRound::from_open(
            &round,
            CancelReason::InsufficientParticipants {
                required: 2,
                actual: 1,
            },
            cancelled_at,
        )
        .into()
    }

    #[tokio::test]
    async fn test_record_once() {
        let store = MemoryRoundStore::new();
        store.record(cancelled(1, "alice", 10)).await.unwrap();
        assert_eq!(
            store.record(cancelled(1, "alice", 20)).await,
            Err(StorageError::AlreadyRecorded(1))
        );

        let record = store.get(1).await.unwrap().unwrap();
        assert_eq!(record.finished_at(), 10);
        assert!(store.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_and_prune() {
        let store = MemoryRoundStore::new();
        store.record(cancelled(1, "alice", 10)).await.unwrap();
        store.record(cancelled(2, "bob", 20)).await.unwrap();
        store.record(cancelled(3, "alice", 30)).await.unwrap();

        let ids: Vec<RoundId> = store
            .history(None, 10)
            .await
            .unwrap()
            .iter()
            .map(RoundRecord::id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let ids: Vec<RoundId> = store
            .history(Some("alice"), 1)
            .await
            .unwrap()
            .iter()
            .map(RoundRecord::id)
            .collect();
        assert_eq!(ids, vec![3]);

        assert_eq!(store.prune_before(20).await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 2);
        assert!(store.get(1).await.unwrap().is_none());
    }
}
