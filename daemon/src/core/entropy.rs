use async_trait::async_trait;
use log::trace;
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use thiserror::Error;

use prizepool_common::crypto::random::secure_random_proof_hash;

/// Block data used as external entropy of a distribution
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockEntropy {
    /// 0x + 64 hex digits
    pub hash: String,
    pub height: u64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntropyError {
    #[error("Entropy source unavailable: {0}")]
    Unavailable(String),
}

/// Provider of external entropy, usually the latest block of a ledger
///
/// The returned hash is validated by the caller, an implementation does not
/// have to check its format.
#[async_trait]
pub trait EntropySource: Send + Sync {
    async fn next_block(&self) -> Result<BlockEntropy, EntropyError>;
}

#[async_trait]
impl<T: EntropySource + ?Sized> EntropySource for Arc<T> {
    async fn next_block(&self) -> Result<BlockEntropy, EntropyError> {
        (**self).next_block().await
    }
}

/// Entropy source producing random block hashes with increasing heights
///
/// Stands in for a ledger when running without one (simulations, tests).
pub struct SimulatedEntropySource {
    height: AtomicU64,
}

impl SimulatedEntropySource {
    pub fn new(start_height: u64) -> Self {
        Self {
            height: AtomicU64::new(start_height),
        }
    }

    // Height of the last block handed out
    pub fn height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedEntropySource {
    fn default() -> Self {
        Self::new(0)
    }
}

#[async_trait]
impl EntropySource for SimulatedEntropySource {
    async fn next_block(&self) -> Result<BlockEntropy, EntropyError> {
        let height = self.height.fetch_add(1, Ordering::SeqCst) + 1;
        let hash = secure_random_proof_hash().to_string();
        trace!("Simulated block {} at height {}", hash, height);

        Ok(BlockEntropy { hash, height })
    }
}
