use log::trace;
use serde::Serialize;
use tokio::sync::broadcast;

use prizepool_common::round::{Address, CancelReason, RoundId, RoundMode};

/// Notifications emitted along the lifecycle of a round
///
/// Delivery to participants is up to the subscribers.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RoundEvent {
    #[serde(rename_all = "camelCase")]
    RoundCreated {
        round_id: RoundId,
        creator: Address,
        stake: u64,
        mode: RoundMode,
    },
    #[serde(rename_all = "camelCase")]
    ParticipantJoined {
        round_id: RoundId,
        address: Address,
        participants: usize,
    },
    // Emitted once per time-locked round
    #[serde(rename_all = "camelCase")]
    RoundExpiringSoon {
        round_id: RoundId,
        seconds_remaining: u64,
        participants: Vec<Address>,
    },
    #[serde(rename_all = "camelCase")]
    PayoutReceived {
        round_id: RoundId,
        address: Address,
        amount: u64,
        profit: i64,
        is_winner: bool,
    },
    #[serde(rename_all = "camelCase")]
    RoundCompleted {
        round_id: RoundId,
        participants: usize,
        total_pool: u64,
        winners: usize,
    },
    // One per participant
    #[serde(rename_all = "camelCase")]
    RoundCancelled {
        round_id: RoundId,
        address: Address,
        refund: u64,
        reason: CancelReason,
    },
}

impl RoundEvent {
    pub fn round_id(&self) -> RoundId {
        match self {
            Self::RoundCreated { round_id, .. }
            | Self::ParticipantJoined { round_id, .. }
            | Self::RoundExpiringSoon { round_id, .. }
            | Self::PayoutReceived { round_id, .. }
            | Self::RoundCompleted { round_id, .. }
            | Self::RoundCancelled { round_id, .. } => *round_id,
        }
    }
}

/// Fan-out channel of round events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RoundEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.sender.subscribe()
    }

    pub fn subscribers(&self) -> usize {
        self.sender.receiver_count()
    }

    // Events are dropped when nobody listens
    pub fn emit(&self, event: RoundEvent) {
        if self.sender.send(event).is_err() {
            trace!("No subscriber for round event");
        }
    }
}
