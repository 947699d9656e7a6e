use thiserror::Error;

use prizepool_common::{
    crypto::ProofFormatError,
    fairness::DistributionError,
    round::{RoundError, RoundId},
};

use super::{entropy::EntropyError, storage::StorageError};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Round(#[from] RoundError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Entropy(#[from] EntropyError),

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error("Invalid block hash from entropy source: {0}")]
    InvalidBlockHash(#[from] ProofFormatError),

    #[error("Audit of round {id} failed: {message}")]
    AuditFailed { id: RoundId, message: String },
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
