use dashmap::DashMap;
use log::{debug, error, info, trace, warn};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::Mutex;

use prizepool_common::{
    config::MIN_PARTICIPANTS,
    fairness::{
        calculate_distribution, commit_hash, generate_random_values, parse_proof_hex,
        verify_round, RandomnessProof,
    },
    round::{
        commit_salt, derive_round_seed, Address, CancelReason, CancelledRound, CloseReason,
        CreateRoundParams, DistributedRound, JoinOutcome, OpenRound, RoundError, RoundId,
        RoundRecord, RoundResult, RoundStatus,
    },
    stats::UserStats,
    time::TimestampSeconds,
};

use crate::config::ManagerConfig;

use super::{
    entropy::EntropySource,
    error::{LifecycleError, LifecycleResult},
    events::{EventBus, RoundEvent},
    storage::RoundStore,
};

// State of a round still owned by the manager
struct RoundSlot {
    round: OpenRound,
    status: RoundStatus,
    expiry_warned: bool,
}

/// Owns the open rounds and drives them to a terminal record
///
/// Every round sits behind its own mutex. Closing a round flips its status
/// under that mutex, then releases it before any await on the entropy
/// source or the store: joins racing with a closure see ACTIVE and are
/// rejected instead of waiting, and only one closure per round gets past
/// the status check.
pub struct RoundManager<S: RoundStore, E: EntropySource> {
    config: ManagerConfig,
    store: S,
    entropy: E,
    events: EventBus,
    rounds: DashMap<RoundId, Arc<Mutex<RoundSlot>>>,
    next_id: AtomicU64,
}

impl<S: RoundStore, E: EntropySource> RoundManager<S, E> {
    pub fn new(config: ManagerConfig, store: S, entropy: E, events: EventBus) -> Self {
        Self {
            config,
            store,
            entropy,
            events,
            rounds: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn entropy(&self) -> &E {
        &self.entropy
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // Open a new round, its creator is the first participant
    pub fn create_round(
        &self,
        params: CreateRoundParams,
        now: TimestampSeconds,
    ) -> RoundResult<RoundId> {
        // Rejected parameters still consume an id
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let round = OpenRound::new(id, params, self.config.platform_fee_bps, now)?;

        if log::log_enabled!(log::Level::Info) {
            info!(
                "Round {} created by {} with a stake of {} ({:?})",
                id,
                round.creator(),
                round.stake(),
                round.mode()
            );
        }

        let event = RoundEvent::RoundCreated {
            round_id: id,
            creator: round.creator().to_string(),
            stake: round.stake(),
            mode: *round.mode(),
        };
        self.rounds.insert(
            id,
            Arc::new(Mutex::new(RoundSlot {
                round,
                status: RoundStatus::Open,
                expiry_warned: false,
            })),
        );
        self.events.emit(event);

        Ok(id)
    }

    // Add a participant to an open round
    // A capacity-locked round reaching its target is closed before returning
    pub async fn join_round(
        &self,
        id: RoundId,
        address: Address,
        now: TimestampSeconds,
    ) -> LifecycleResult<JoinOutcome> {
        let slot = self.slot(id).await?;
        let outcome = {
            let mut slot = slot.lock().await;
            if slot.status != RoundStatus::Open {
                return Err(RoundError::NotOpen {
                    id,
                    status: slot.status,
                }
                .into());
            }
            slot.round.join(address.clone(), now)?
        };

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "{} joined round {} ({} participants)",
                address, id, outcome.participants
            );
        }
        self.events.emit(RoundEvent::ParticipantJoined {
            round_id: id,
            address,
            participants: outcome.participants,
        });

        if outcome.capacity_reached {
            // The join itself succeeded, a failed closure is only reported
            if let Err(e) = self
                .close_round(id, CloseReason::CapacityReached, now)
                .await
            {
                if log::log_enabled!(log::Level::Error) {
                    error!("Error while closing full round {}: {}", id, e);
                }
            }
        }

        Ok(outcome)
    }

    // Close a round and store its terminal record
    //
    // Returns None when the round was already being closed by someone else.
    // A deadline or capacity close must match the round's own trigger at `now`,
    // a manual close is accepted at any time.
    // A round below the participant minimum is cancelled, so is a round whose
    // distribution fails at any step: no partial distributed record is stored.
    pub async fn close_round(
        &self,
        id: RoundId,
        reason: CloseReason,
        now: TimestampSeconds,
    ) -> LifecycleResult<Option<RoundRecord>> {
        let slot = self.slot(id).await?;
        let (round, distribute) = {
            let mut slot = slot.lock().await;
            if slot.status != RoundStatus::Open {
                trace!("Round {} is already {}", id, slot.status);
                return Ok(None);
            }
            if reason != CloseReason::Manual && slot.round.trigger(now) != Some(reason) {
                return Err(RoundError::CloseNotTriggered { id, reason }.into());
            }

            let distribute = slot.round.participant_count() >= MIN_PARTICIPANTS;
            slot.status = if distribute {
                RoundStatus::Active
            } else {
                RoundStatus::Cancelled
            };
            (slot.round.clone(), distribute)
        };

        if log::log_enabled!(log::Level::Info) {
            info!(
                "Closing round {} ({}) with {} participants",
                id,
                reason,
                round.participant_count()
            );
        }

        let record = if distribute {
            match self.distribute(&round, reason, now).await {
                Ok(record) => RoundRecord::Distributed(record),
                Err(e) => {
                    if log::log_enabled!(log::Level::Warn) {
                        warn!("Distribution of round {} failed, cancelling: {}", id, e);
                    }
                    cancellation(&round, distribution_failed(&e), now)
                }
            }
        } else {
            cancellation(
                &round,
                CancelReason::InsufficientParticipants {
                    required: MIN_PARTICIPANTS,
                    actual: round.participant_count(),
                },
                now,
            )
        };

        let result = self.persist(record.clone(), &round, now).await;

        // The round leaves the active set whatever the outcome
        {
            let mut slot = slot.lock().await;
            slot.status = match &result {
                Ok(record) => record.status(),
                Err(_) => RoundStatus::Cancelled,
            };
        }
        self.rounds.remove(&id);

        match result {
            Ok(record) => {
                self.announce(&record);
                Ok(Some(record))
            }
            Err(e) => {
                if log::log_enabled!(log::Level::Error) {
                    error!("Round {} could not be recorded: {}", id, e);
                }
                // Participants are still told their stakes are refunded
                let unrecorded = match record {
                    RoundRecord::Cancelled(_) => record,
                    RoundRecord::Distributed(_) => {
                        cancellation(&round, distribution_failed(&e), now)
                    }
                };
                self.announce(&unrecorded);
                Err(e)
            }
        }
    }

    // Close every round whose deadline passed, warn rounds close to it
    // Returns the records produced by this tick
    pub async fn tick(&self, now: TimestampSeconds) -> Vec<RoundRecord> {
        let slots: Vec<(RoundId, Arc<Mutex<RoundSlot>>)> = self
            .rounds
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        let mut closed = Vec::new();
        for (id, slot) in slots {
            let (reason, warning) = {
                let mut slot = slot.lock().await;
                if slot.status != RoundStatus::Open {
                    continue;
                }

                match slot.round.trigger(now) {
                    Some(reason) => (Some(reason), None),
                    None => {
                        let remaining = slot.round.seconds_remaining(now);
                        match remaining {
                            Some(remaining)
                                if !slot.expiry_warned
                                    && remaining <= self.config.expiry_warning_secs =>
                            {
                                slot.expiry_warned = true;
                                let participants: Vec<Address> =
                                    slot.round.participants().iter().cloned().collect();
                                (None, Some((remaining, participants)))
                            }
                            _ => (None, None),
                        }
                    }
                }
            };

            if let Some((seconds_remaining, participants)) = warning {
                debug!("Round {} expires in {}s", id, seconds_remaining);
                self.events.emit(RoundEvent::RoundExpiringSoon {
                    round_id: id,
                    seconds_remaining,
                    participants,
                });
            }

            if let Some(reason) = reason {
                match self.close_round(id, reason, now).await {
                    Ok(Some(record)) => closed.push(record),
                    Ok(None) => {}
                    Err(e) => {
                        if log::log_enabled!(log::Level::Error) {
                            error!("Error while closing round {} on tick: {}", id, e);
                        }
                    }
                }
            }
        }

        closed
    }

    // Snapshot of an active round
    pub async fn round(&self, id: RoundId) -> Option<(OpenRound, RoundStatus)> {
        let slot = self.rounds.get(&id).map(|entry| Arc::clone(entry.value()))?;
        let slot = slot.lock().await;
        Some((slot.round.clone(), slot.status))
    }

    pub fn active_round_ids(&self) -> Vec<RoundId> {
        let mut ids: Vec<RoundId> = self.rounds.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub async fn user_stats(&self, address: &str) -> LifecycleResult<UserStats> {
        let history = self.store.history(Some(address), usize::MAX).await?;
        Ok(UserStats::from_history(address, &history))
    }

    // Drop history older than `retention_secs`
    pub async fn prune_history(
        &self,
        now: TimestampSeconds,
        retention_secs: u64,
    ) -> LifecycleResult<usize> {
        let cutoff = now.saturating_sub(retention_secs);
        let pruned = self.store.prune_before(cutoff).await?;
        if pruned > 0 && log::log_enabled!(log::Level::Info) {
            info!("Pruned {} rounds finished before {}", pruned, cutoff);
        }
        Ok(pruned)
    }

    // Active slot of a round, or the reason it is not available
    async fn slot(&self, id: RoundId) -> LifecycleResult<Arc<Mutex<RoundSlot>>> {
        if let Some(slot) = self.rounds.get(&id).map(|entry| Arc::clone(entry.value())) {
            return Ok(slot);
        }

        match self.store.get(id).await? {
            Some(record) => Err(RoundError::NotOpen {
                id,
                status: record.status(),
            }
            .into()),
            None => Err(RoundError::NotFound(id).into()),
        }
    }

    async fn distribute(
        &self,
        round: &OpenRound,
        reason: CloseReason,
        now: TimestampSeconds,
    ) -> LifecycleResult<DistributedRound> {
        let id = round.id();
        let addresses = round.addresses();
        let seed = derive_round_seed(id, round.created_at(), &addresses, now);

        let block = self.entropy.next_block().await?;
        parse_proof_hex(&block.hash)?;

        let random_values = generate_random_values(&seed, &block.hash, &addresses);
        let distribution =
            calculate_distribution(&round.stakes(), &random_values, round.platform_fee_bps())?;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Round {}: pool {}, fee {}, bonus {}, rounding loss {}",
                id,
                distribution.total_pool,
                distribution.platform_fee,
                distribution.bonus_pool,
                distribution.rounding_loss()
            );
        }

        let proof = RandomnessProof {
            commit_hash: commit_hash(&seed, &commit_salt(id)),
            seed,
            block_hash: block.hash,
            block_height: block.height,
            reveal_timestamp: now,
        };
        let record = DistributedRound::from_distribution(round, &distribution, proof, reason, now)?;

        if self.config.self_audit {
            let report = verify_round(&record);
            if !report.is_valid {
                return Err(LifecycleError::AuditFailed {
                    id,
                    message: report.message,
                });
            }
            trace!("{}", report.message);
        }

        Ok(record)
    }

    // Store a record; a distributed record that cannot be stored is replaced
    // by a cancellation
    async fn persist(
        &self,
        record: RoundRecord,
        round: &OpenRound,
        now: TimestampSeconds,
    ) -> LifecycleResult<RoundRecord> {
        match self.store.record(record.clone()).await {
            Ok(()) => Ok(record),
            Err(e) if record.status() == RoundStatus::Distributed => {
                if log::log_enabled!(log::Level::Warn) {
                    warn!("Round {} could not be stored, cancelling: {}", round.id(), e);
                }
                let e = LifecycleError::from(e);
                let cancelled = cancellation(round, distribution_failed(&e), now);
                self.store.record(cancelled.clone()).await?;
                Ok(cancelled)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn announce(&self, record: &RoundRecord) {
        match record {
            RoundRecord::Distributed(round) => {
                for entry in &round.payout_distribution {
                    self.events.emit(RoundEvent::PayoutReceived {
                        round_id: round.id,
                        address: entry.address.clone(),
                        amount: entry.amount,
                        profit: entry.profit,
                        is_winner: entry.is_winner,
                    });
                }
                self.events.emit(RoundEvent::RoundCompleted {
                    round_id: round.id,
                    participants: round.participants,
                    total_pool: round.total_pool,
                    winners: round.winners().count(),
                });

                if log::log_enabled!(log::Level::Info) {
                    info!(
                        "Round {} distributed {} to {} participants",
                        round.id,
                        round.total_pool,
                        round.participants
                    );
                }
            }
            RoundRecord::Cancelled(round) => {
                for address in &round.participants {
                    self.events.emit(RoundEvent::RoundCancelled {
                        round_id: round.id,
                        address: address.clone(),
                        refund: round.refund_amount(),
                        reason: round.reason.clone(),
                    });
                }

                if log::log_enabled!(log::Level::Info) {
                    info!("Round {} cancelled: {:?}", round.id, round.reason);
                }
            }
        }
    }
}

fn cancellation(round: &OpenRound, reason: CancelReason, now: TimestampSeconds) -> RoundRecord {
    CancelledRound::from_open(round, reason, now).into()
}

fn distribution_failed(e: &LifecycleError) -> CancelReason {
    CancelReason::DistributionFailed {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{entropy::SimulatedEntropySource, storage::MemoryRoundStore};
    use prizepool_common::config::COIN_VALUE;

    const NOW: TimestampSeconds = 1_700_000_000;

    fn manager() -> RoundManager<MemoryRoundStore, SimulatedEntropySource> {
        let config = ManagerConfig {
            self_audit: true,
            ..ManagerConfig::default()
        };
        RoundManager::new(
            config,
            MemoryRoundStore::new(),
            SimulatedEntropySource::default(),
            EventBus::new(64),
        )
    }

    #[tokio::test]
    async fn test_full_round_is_distributed() {
        let manager = manager();
        let id = manager
            .create_round(CreateRoundParams::capacity_locked("alice", COIN_VALUE, 3), NOW)
            .unwrap();
        assert_eq!(manager.active_round_ids(), vec![id]);

        manager.join_round(id, "bob".into(), NOW + 1).await.unwrap();
        let outcome = manager.join_round(id, "carol".into(), NOW + 2).await.unwrap();
        assert!(outcome.capacity_reached);
        assert!(manager.active_round_ids().is_empty());

        let record = manager.store().get(id).await.unwrap().unwrap();
        let round = record.as_distributed().unwrap();
        assert_eq!(round.close_reason, CloseReason::CapacityReached);
        assert_eq!(round.addresses(), vec!["alice", "bob", "carol"]);
        assert!(verify_round(round).is_valid);
    }

    #[test]
    fn test_invalid_round_is_not_registered() {
        let manager = manager();
        let result =
            manager.create_round(CreateRoundParams::capacity_locked("alice", 1, 3), NOW);
        assert!(matches!(result, Err(RoundError::StakeTooLow { stake: 1, .. })));

        let result = manager.create_round(
            CreateRoundParams::time_locked("alice", COIN_VALUE, NOW + 60),
            NOW,
        );
        assert!(matches!(result, Err(RoundError::DeadlineTooSoon { .. })));
        assert!(manager.active_round_ids().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_closed_rounds() {
        let manager = manager();
        assert!(matches!(
            manager.join_round(42, "bob".into(), NOW).await,
            Err(LifecycleError::Round(RoundError::NotFound(42)))
        ));

        let id = manager
            .create_round(CreateRoundParams::capacity_locked("alice", COIN_VALUE, 3), NOW)
            .unwrap();
        let record = manager
            .close_round(id, CloseReason::Manual, NOW + 5)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status(), RoundStatus::Cancelled);

        assert!(matches!(
            manager.join_round(id, "bob".into(), NOW + 6).await,
            Err(LifecycleError::Round(RoundError::NotOpen {
                status: RoundStatus::Cancelled,
                ..
            }))
        ));
    }
}
