use serde::{Deserialize, Serialize};

use crate::{
    fairness::{Distribution, RandomnessProof},
    time::TimestampSeconds,
};

use super::{
    Address, CloseReason, OpenRound, RoundError, RoundId, RoundMode, RoundResult, RoundStatus,
};

/// Payout of one participant
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutEntry {
    pub address: Address,
    /// Amount paid back, in nanoton
    pub amount: u64,
    /// amount - stake, negative for a loss
    pub profit: i64,
    pub is_winner: bool,
}

impl PayoutEntry {
    pub fn new(address: Address, amount: u64, stake: u64) -> Self {
        let profit = signed_difference(amount, stake);
        Self {
            address,
            amount,
            profit,
            is_winner: profit > 0,
        }
    }

    // Profit and winner flag agree with the amount
    pub fn is_consistent_with(&self, stake: u64) -> bool {
        self.profit == signed_difference(self.amount, stake) && self.is_winner == (self.profit > 0)
    }
}

// a - b, clamped into i64
fn signed_difference(a: u64, b: u64) -> i64 {
    let diff = a as i128 - b as i128;
    i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
}

/// Terminal record of a round whose pool was distributed
///
/// Holds everything a third party needs to re-run the distribution:
/// proof material, participants in join order, stake and fee.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DistributedRound {
    pub id: RoundId,
    pub creator: Address,
    pub mode: RoundMode,
    pub stake: u64,
    pub platform_fee_bps: u16,
    /// Number of participants
    pub participants: usize,
    /// Sum of the stakes net of fee, accumulated while joining
    pub bank: u64,
    pub total_pool: u64,
    pub platform_fee: u64,
    pub bonus_pool: u64,
    pub created_at: TimestampSeconds,
    pub completed_at: TimestampSeconds,
    pub close_reason: CloseReason,
    pub proof: RandomnessProof,
    /// One entry per participant, in join order
    pub payout_distribution: Vec<PayoutEntry>,
}

impl DistributedRound {
    pub fn from_distribution(
        round: &OpenRound,
        distribution: &Distribution,
        proof: RandomnessProof,
        close_reason: CloseReason,
        completed_at: TimestampSeconds,
    ) -> RoundResult<Self> {
        let participants = round.participant_count();
        if distribution.payouts.len() != participants {
            return Err(RoundError::InconsistentDistribution {
                id: round.id(),
                expected: participants,
                actual: distribution.payouts.len(),
            });
        }

        let payout_distribution = round
            .participants()
            .iter()
            .zip(distribution.payouts.iter())
            .map(|(address, amount)| PayoutEntry::new(address.clone(), *amount, round.stake()))
            .collect();

        Ok(Self {
            id: round.id(),
            creator: round.creator().to_string(),
            mode: *round.mode(),
            stake: round.stake(),
            platform_fee_bps: round.platform_fee_bps(),
            participants,
            bank: round.bank(),
            total_pool: distribution.total_pool,
            platform_fee: distribution.platform_fee,
            bonus_pool: distribution.bonus_pool,
            created_at: round.created_at(),
            completed_at,
            close_reason,
            proof,
            payout_distribution,
        })
    }

    pub fn addresses(&self) -> Vec<&str> {
        self.payout_distribution
            .iter()
            .map(|entry| entry.address.as_str())
            .collect()
    }

    pub fn stakes(&self) -> Vec<u64> {
        vec![self.stake; self.payout_distribution.len()]
    }

    pub fn claimed_payouts(&self) -> Vec<u64> {
        self.payout_distribution
            .iter()
            .map(|entry| entry.amount)
            .collect()
    }

    pub fn payout_for(&self, address: &str) -> Option<&PayoutEntry> {
        self.payout_distribution
            .iter()
            .find(|entry| entry.address == address)
    }

    pub fn winners(&self) -> impl Iterator<Item = &PayoutEntry> {
        self.payout_distribution.iter().filter(|entry| entry.is_winner)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CancelReason {
    /// Fewer participants than required to distribute
    #[serde(rename_all = "camelCase")]
    InsufficientParticipants { required: usize, actual: usize },
    /// Entropy, distribution or storage failed during closure
    #[serde(rename_all = "camelCase")]
    DistributionFailed { message: String },
}

/// Terminal record of a round that was not distributed
///
/// Every participant is refunded its full stake.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CancelledRound {
    pub id: RoundId,
    pub creator: Address,
    pub mode: RoundMode,
    pub stake: u64,
    pub platform_fee_bps: u16,
    pub participants: Vec<Address>,
    pub bank: u64,
    pub created_at: TimestampSeconds,
    pub cancelled_at: TimestampSeconds,
    pub reason: CancelReason,
}

impl CancelledRound {
    pub fn from_open(round: &OpenRound, reason: CancelReason, cancelled_at: TimestampSeconds) -> Self {
        Self {
            id: round.id(),
            creator: round.creator().to_string(),
            mode: *round.mode(),
            stake: round.stake(),
            platform_fee_bps: round.platform_fee_bps(),
            participants: round.participants().iter().cloned().collect(),
            bank: round.bank(),
            created_at: round.created_at(),
            cancelled_at,
            reason,
        }
    }

    pub fn refund_amount(&self) -> u64 {
        self.stake
    }
}

/// Any finished round, as kept in history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundRecord {
    Distributed(DistributedRound),
    Cancelled(CancelledRound),
}

impl RoundRecord {
    pub fn id(&self) -> RoundId {
        match self {
            Self::Distributed(round) => round.id,
            Self::Cancelled(round) => round.id,
        }
    }

    pub fn status(&self) -> RoundStatus {
        match self {
            Self::Distributed(_) => RoundStatus::Distributed,
            Self::Cancelled(_) => RoundStatus::Cancelled,
        }
    }

    pub fn finished_at(&self) -> TimestampSeconds {
        match self {
            Self::Distributed(round) => round.completed_at,
            Self::Cancelled(round) => round.cancelled_at,
        }
    }

    pub fn as_distributed(&self) -> Option<&DistributedRound> {
        match self {
            Self::Distributed(round) => Some(round),
            Self::Cancelled(_) => None,
        }
    }

    pub fn has_participant(&self, address: &str) -> bool {
        match self {
            Self::Distributed(round) => round.payout_for(address).is_some(),
            Self::Cancelled(round) => round.participants.iter().any(|p| p == address),
        }
    }
}

impl From<DistributedRound> for RoundRecord {
    fn from(round: DistributedRound) -> Self {
        Self::Distributed(round)
    }
}

impl From<CancelledRound> for RoundRecord {
    fn from(round: CancelledRound) -> Self {
        Self::Cancelled(round)
    }
}
