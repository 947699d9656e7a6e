use thiserror::Error;

use crate::time::TimestampSeconds;

use super::{Address, CloseReason, RoundId, RoundStatus};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoundError {
    #[error("Round {0} not found")]
    NotFound(RoundId),

    #[error("Round {id} is {status}, not accepting participants")]
    NotOpen { id: RoundId, status: RoundStatus },

    #[error("{address} already joined round {id}")]
    AlreadyJoined { id: RoundId, address: Address },

    #[error("Round {id} is full ({target} participants)")]
    RoundFull { id: RoundId, target: usize },

    #[error("Deadline of round {id} passed at {deadline}")]
    DeadlinePassed {
        id: RoundId,
        deadline: TimestampSeconds,
    },

    #[error("Participant address is empty")]
    EmptyAddress,

    #[error("Stake {stake} is below the minimum of {min}")]
    StakeTooLow { stake: u64, min: u64 },

    #[error("Stake {stake} is above the maximum of {max}")]
    StakeTooHigh { stake: u64, max: u64 },

    #[error("Deadline {deadline} is too soon, earliest allowed is {earliest}")]
    DeadlineTooSoon {
        deadline: TimestampSeconds,
        earliest: TimestampSeconds,
    },

    #[error("Deadline {deadline} is too far, latest allowed is {latest}")]
    DeadlineTooLate {
        deadline: TimestampSeconds,
        latest: TimestampSeconds,
    },

    #[error("Target of {target} participants is outside [{min}, {max}]")]
    InvalidTarget {
        target: usize,
        min: usize,
        max: usize,
    },

    #[error("Platform fee {bps} bps exceeds maximum {max} bps")]
    InvalidFeeBps { bps: u16, max: u16 },

    #[error("Bank of round {0} overflows")]
    BankOverflow(RoundId),

    // Only a manual close may ignore the round's own trigger
    #[error("Round {id} cannot be closed as {reason} yet")]
    CloseNotTriggered { id: RoundId, reason: CloseReason },

    #[error("Distribution of round {id} has {actual} payouts for {expected} participants")]
    InconsistentDistribution {
        id: RoundId,
        expected: usize,
        actual: usize,
    },
}

pub type RoundResult<T> = Result<T, RoundError>;
