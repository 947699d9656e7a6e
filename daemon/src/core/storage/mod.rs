mod memory;

pub use memory::MemoryRoundStore;

use async_trait::async_trait;
use thiserror::Error;

use prizepool_common::{
    round::{RoundId, RoundRecord},
    time::TimestampSeconds,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    // Terminal records are written once
    #[error("Round {0} is already recorded")]
    AlreadyRecorded(RoundId),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence of finished rounds
#[async_trait]
pub trait RoundStore: Send + Sync {
    /// Store the terminal record of a round, fails if the round already has one
    async fn record(&self, record: RoundRecord) -> Result<(), StorageError>;

    async fn get(&self, id: RoundId) -> Result<Option<RoundRecord>, StorageError>;

    /// Records, most recent first, optionally limited to those `address` took part in
    async fn history(
        &self,
        address: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RoundRecord>, StorageError>;

    /// Delete the records finished before `cutoff`
    /// Returns the count of removed records
    async fn prune_before(&self, cutoff: TimestampSeconds) -> Result<usize, StorageError>;

    async fn count(&self) -> Result<usize, StorageError>;
}
