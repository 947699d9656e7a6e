use log::{debug, error, info};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

use prizepool_common::time::get_current_time_in_seconds;

use crate::config::PRUNE_INTERVAL;

use super::{entropy::EntropySource, manager::RoundManager, storage::RoundStore};

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
    pub prune_interval: Duration,
    pub history_retention_secs: u64,
}

impl SchedulerConfig {
    pub fn new(tick_interval: Duration, history_retention_secs: u64) -> Self {
        Self {
            tick_interval,
            prune_interval: PRUNE_INTERVAL,
            history_retention_secs,
        }
    }
}

// Drive the manager with the wall clock until `shutdown` turns true
// or its sender is dropped
pub fn spawn_scheduler<S, E>(
    manager: Arc<RoundManager<S, E>>,
    config: SchedulerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    S: RoundStore + 'static,
    E: EntropySource + 'static,
{
    tokio::spawn(async move {
        let mut tick_timer = interval(config.tick_interval);
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut prune_timer = interval(config.prune_interval);
        prune_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if log::log_enabled!(log::Level::Info) {
            info!(
                "Scheduler started, ticking every {:?}",
                config.tick_interval
            );
        }

        loop {
            tokio::select! {
                _ = tick_timer.tick() => {
                    let closed = manager.tick(get_current_time_in_seconds()).await;
                    if !closed.is_empty() {
                        debug!("{} rounds closed on tick", closed.len());
                    }
                }
                _ = prune_timer.tick() => {
                    let now = get_current_time_in_seconds();
                    if let Err(e) = manager.prune_history(now, config.history_retention_secs).await {
                        if log::log_enabled!(log::Level::Error) {
                            error!("Error while pruning history: {}", e);
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Scheduler stopped");
    })
}
