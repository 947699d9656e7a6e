use indexmap::IndexSet;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    config::MAX_PLATFORM_FEE_BPS,
    fairness::net_stake,
    time::TimestampSeconds,
};

use super::{
    Address, CloseReason, CreateRoundParams, RoundError, RoundId, RoundMode, RoundResult,
};

/// Result of a successful join
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Participants after the join, creator included
    pub participants: usize,
    /// The round reached its target and must be closed now
    pub capacity_reached: bool,
}

/// A round accepting participants
///
/// The participant set keeps join order, the creator is always first.
/// `bank` is the sum of every participant's stake net of the platform fee.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenRound {
    id: RoundId,
    creator: Address,
    mode: RoundMode,
    stake: u64,
    platform_fee_bps: u16,
    participants: IndexSet<Address>,
    bank: u64,
    created_at: TimestampSeconds,
}

impl OpenRound {
    // Create a round, the creator joins it immediately
    pub fn new(
        id: RoundId,
        params: CreateRoundParams,
        platform_fee_bps: u16,
        now: TimestampSeconds,
    ) -> RoundResult<Self> {
        params.validate(now)?;
        if platform_fee_bps > MAX_PLATFORM_FEE_BPS {
            return Err(RoundError::InvalidFeeBps {
                bps: platform_fee_bps,
                max: MAX_PLATFORM_FEE_BPS,
            });
        }

        let mut participants = IndexSet::new();
        participants.insert(params.creator.clone());

        Ok(Self {
            id,
            creator: params.creator,
            mode: params.mode,
            stake: params.stake,
            platform_fee_bps,
            participants,
            bank: net_stake(params.stake, platform_fee_bps),
            created_at: now,
        })
    }

    pub fn join(&mut self, address: Address, now: TimestampSeconds) -> RoundResult<JoinOutcome> {
        if address.trim().is_empty() {
            return Err(RoundError::EmptyAddress);
        }

        match self.mode {
            RoundMode::TimeLocked { deadline } if now >= deadline => {
                return Err(RoundError::DeadlinePassed {
                    id: self.id,
                    deadline,
                });
            }
            RoundMode::CapacityLocked {
                target_participants,
            } if self.participants.len() >= target_participants => {
                return Err(RoundError::RoundFull {
                    id: self.id,
                    target: target_participants,
                });
            }
            _ => {}
        }

        if self.participants.contains(&address) {
            return Err(RoundError::AlreadyJoined {
                id: self.id,
                address,
            });
        }

        let bank = self
            .bank
            .checked_add(net_stake(self.stake, self.platform_fee_bps))
            .ok_or(RoundError::BankOverflow(self.id))?;

        trace!("{} joins round {}", address, self.id);
        self.participants.insert(address);
        self.bank = bank;

        let participants = self.participants.len();
        Ok(JoinOutcome {
            participants,
            capacity_reached: self
                .mode
                .target_participants()
                .is_some_and(|target| participants >= target),
        })
    }

    // Reason to close the round at `now`, if any
    pub fn trigger(&self, now: TimestampSeconds) -> Option<CloseReason> {
        match self.mode {
            RoundMode::TimeLocked { deadline } if now >= deadline => {
                Some(CloseReason::DeadlineReached)
            }
            RoundMode::CapacityLocked {
                target_participants,
            } if self.participants.len() >= target_participants => {
                Some(CloseReason::CapacityReached)
            }
            _ => None,
        }
    }

    // Seconds left before the deadline, None for capacity-locked rounds
    pub fn seconds_remaining(&self, now: TimestampSeconds) -> Option<u64> {
        self.mode
            .deadline()
            .map(|deadline| deadline.saturating_sub(now))
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn mode(&self) -> &RoundMode {
        &self.mode
    }

    pub fn stake(&self) -> u64 {
        self.stake
    }

    pub fn platform_fee_bps(&self) -> u16 {
        self.platform_fee_bps
    }

    pub fn bank(&self) -> u64 {
        self.bank
    }

    pub fn created_at(&self) -> TimestampSeconds {
        self.created_at
    }

    pub fn participants(&self) -> &IndexSet<Address> {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn has_participant(&self, address: &str) -> bool {
        self.participants.contains(address)
    }

    // Addresses in join order
    pub fn addresses(&self) -> Vec<&str> {
        self.participants.iter().map(String::as_str).collect()
    }

    // Every participant pays the same stake
    pub fn stakes(&self) -> Vec<u64> {
        vec![self.stake; self.participants.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::COIN_VALUE;

    const NOW: TimestampSeconds = 1_700_000_000;

    fn capacity_round(target: usize) -> OpenRound {
        let params = CreateRoundParams::capacity_locked("creator", COIN_VALUE, target);
        OpenRound::new(1, params, 500, NOW).unwrap()
    }

    #[test]
    fn test_creator_joins_on_creation() {
        let round = capacity_round(3);
        assert_eq!(round.participant_count(), 1);
        assert_eq!(round.addresses(), vec!["creator"]);
        assert_eq!(round.bank(), 950_000_000);
        assert_eq!(round.trigger(NOW), None);
    }

    #[test]
    fn test_join_until_capacity() {
        let mut round = capacity_round(3);
        let outcome = round.join("alice".to_string(), NOW).unwrap();
        assert_eq!(
            outcome,
            JoinOutcome {
                participants: 2,
                capacity_reached: false
            }
        );

        let outcome = round.join("bob".to_string(), NOW).unwrap();
        assert!(outcome.capacity_reached);
        assert_eq!(round.trigger(NOW), Some(CloseReason::CapacityReached));
        assert_eq!(round.bank(), 3 * 950_000_000);
        assert_eq!(round.stakes(), vec![COIN_VALUE; 3]);

        assert_eq!(
            round.join("carol".to_string(), NOW),
            Err(RoundError::RoundFull { id: 1, target: 3 })
        );
    }

    #[test]
    fn test_duplicate_join_rejected() {
        let mut round = capacity_round(5);
        assert!(matches!(
            round.join("creator".to_string(), NOW),
            Err(RoundError::AlreadyJoined { .. })
        ));
        assert_eq!(round.join(String::new(), NOW), Err(RoundError::EmptyAddress));
        assert_eq!(round.participant_count(), 1);
        assert_eq!(round.bank(), 950_000_000);
    }

    #[test]
    fn test_deadline() {
        let deadline = NOW + 3600;
        let params = CreateRoundParams::time_locked("creator", COIN_VALUE, deadline);
        let mut round = OpenRound::new(7, params, 500, NOW).unwrap();

        assert_eq!(round.seconds_remaining(NOW), Some(3600));
        assert_eq!(round.trigger(deadline - 1), None);
        assert!(round.join("alice".to_string(), deadline - 1).is_ok());

        assert_eq!(round.trigger(deadline), Some(CloseReason::DeadlineReached));
        assert_eq!(round.seconds_remaining(deadline + 10), Some(0));
        assert_eq!(
            round.join("bob".to_string(), deadline),
            Err(RoundError::DeadlinePassed { id: 7, deadline })
        );
    }

    #[test]
    fn test_invalid_fee_rejected() {
        let params = CreateRoundParams::capacity_locked("creator", COIN_VALUE, 3);
        assert!(matches!(
            OpenRound::new(1, params, 10_001, NOW),
            Err(RoundError::InvalidFeeBps { bps: 10_001, .. })
        ));
    }
}
