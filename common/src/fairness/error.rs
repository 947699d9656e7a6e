use thiserror::Error;

/// Errors raised by the payout distribution calculator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DistributionError {
    /// One random value is required per stake
    #[error("Stakes and random values must have same length: {stakes} stakes, {random_values} random values")]
    LengthMismatch { stakes: usize, random_values: usize },

    /// A distribution needs at least one participant
    #[error("Distribution requires at least one participant")]
    NoParticipants,

    /// Fee outside of [0, 10000] basis points
    #[error("Platform fee {bps} bps exceeds maximum {max} bps")]
    InvalidFeeBps { bps: u16, max: u16 },

    /// Sum of stakes does not fit in u64
    #[error("Total stakes overflow")]
    Overflow,
}

/// Errors raised while re-verifying claimed payouts
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    /// Claimed payout list does not cover every participant exactly once
    #[error("Claimed {claimed} payouts for {expected} participants")]
    ClaimedLengthMismatch { claimed: usize, expected: usize },
}

pub type DistributionResult<T> = Result<T, DistributionError>;
