// Round data model
//
// A round is OPEN while it accepts participants, then ends up either
// DISTRIBUTED or CANCELLED. Each phase is its own type: only `OpenRound`
// can be mutated, terminal records are immutable.

mod error;
mod open;
mod record;
mod seed;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
    config::{
        MAX_PARTICIPANTS, MAX_ROUND_DURATION_SECS, MAX_STAKE, MIN_PARTICIPANTS,
        MIN_ROUND_DURATION_SECS, MIN_STAKE,
    },
    time::TimestampSeconds,
};

pub use error::*;
pub use open::*;
pub use record::*;
pub use seed::*;

pub type RoundId = u64;
// Ledger address of a participant, compared as an opaque string
pub type Address = String;

/// How a round decides that it is over
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundMode {
    /// Closed once `deadline` is reached
    #[serde(rename_all = "camelCase")]
    TimeLocked { deadline: TimestampSeconds },
    /// Closed as soon as `target_participants` have joined
    #[serde(rename_all = "camelCase")]
    CapacityLocked { target_participants: usize },
}

impl RoundMode {
    pub fn deadline(&self) -> Option<TimestampSeconds> {
        match self {
            Self::TimeLocked { deadline } => Some(*deadline),
            Self::CapacityLocked { .. } => None,
        }
    }

    pub fn target_participants(&self) -> Option<usize> {
        match self {
            Self::TimeLocked { .. } => None,
            Self::CapacityLocked {
                target_participants,
            } => Some(*target_participants),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundStatus {
    /// Accepting participants
    Open,
    /// Closure in progress, joins are rejected
    Active,
    Distributed,
    Cancelled,
}

impl RoundStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Distributed | Self::Cancelled)
    }
}

/// Why a round was closed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CloseReason {
    DeadlineReached,
    CapacityReached,
    /// Closed on request (operator or CLI), whatever the trigger says
    Manual,
}

/// Parameters supplied by the creator of a round
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoundParams {
    pub creator: Address,
    pub mode: RoundMode,
    /// Stake paid by every participant, in nanoton
    pub stake: u64,
}

impl CreateRoundParams {
    pub fn time_locked(creator: impl Into<Address>, stake: u64, deadline: TimestampSeconds) -> Self {
        Self {
            creator: creator.into(),
            mode: RoundMode::TimeLocked { deadline },
            stake,
        }
    }

    pub fn capacity_locked(
        creator: impl Into<Address>,
        stake: u64,
        target_participants: usize,
    ) -> Self {
        Self {
            creator: creator.into(),
            mode: RoundMode::CapacityLocked {
                target_participants,
            },
            stake,
        }
    }

    // Check the parameters against the round limits at time `now`
    pub fn validate(&self, now: TimestampSeconds) -> RoundResult<()> {
        if self.creator.trim().is_empty() {
            return Err(RoundError::EmptyAddress);
        }
        if self.stake < MIN_STAKE {
            return Err(RoundError::StakeTooLow {
                stake: self.stake,
                min: MIN_STAKE,
            });
        }
        if self.stake > MAX_STAKE {
            return Err(RoundError::StakeTooHigh {
                stake: self.stake,
                max: MAX_STAKE,
            });
        }

        match self.mode {
            RoundMode::TimeLocked { deadline } => {
                let earliest = now.saturating_add(MIN_ROUND_DURATION_SECS);
                let latest = now.saturating_add(MAX_ROUND_DURATION_SECS);
                if deadline < earliest {
                    return Err(RoundError::DeadlineTooSoon { deadline, earliest });
                }
                if deadline > latest {
                    return Err(RoundError::DeadlineTooLate { deadline, latest });
                }
            }
            RoundMode::CapacityLocked {
                target_participants,
            } => {
                if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&target_participants) {
                    return Err(RoundError::InvalidTarget {
                        target: target_participants,
                        min: MIN_PARTICIPANTS,
                        max: MAX_PARTICIPANTS,
                    });
                }
            }
        }

        Ok(())
    }
}
