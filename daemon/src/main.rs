// Prize pool daemon
//
// Usage:
//   prizepool run
//   prizepool simulate --participants 5 --stake 1.5
//   prizepool verify round.json

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn, LevelFilter};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::{broadcast::error::RecvError, watch};

use prizepool_common::{
    config::{MAX_PARTICIPANTS, MIN_PARTICIPANTS, VERSION},
    fairness::verify_round,
    round::{CreateRoundParams, DistributedRound, RoundRecord},
    time::{get_current_time_in_seconds, TimestampSeconds},
    utils::{
        format_amount_compact, format_coin, format_duration, format_percent_bps, parse_amount,
    },
};
use prizepool_daemon::{
    config::DaemonConfig,
    core::{
        entropy::SimulatedEntropySource,
        events::{EventBus, RoundEvent},
        manager::RoundManager,
        scheduler::{spawn_scheduler, SchedulerConfig},
        storage::{MemoryRoundStore, RoundStore},
    },
};

#[derive(Parser, Debug)]
#[command(name = "prizepool", version = VERSION)]
#[command(about = "Provably fair prize pool rounds")]
struct Cli {
    #[command(flatten)]
    config: DaemonConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the round scheduler until interrupted
    Run,
    /// Play a full round against simulated entropy and print its record
    Simulate {
        /// Participants of the round, creator included
        #[arg(short, long, default_value_t = 5)]
        participants: usize,

        /// Stake of every participant, in TON
        #[arg(short, long, default_value = "1")]
        stake: String,
    },
    /// Audit a distributed round record (JSON)
    Verify {
        /// Path to the record
        path: PathBuf,
    },
}

type Manager = RoundManager<MemoryRoundStore, SimulatedEntropySource>;

fn build_manager(config: &DaemonConfig) -> Manager {
    RoundManager::new(
        config.manager_config(),
        MemoryRoundStore::new(),
        SimulatedEntropySource::default(),
        EventBus::new(config.event_capacity),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(LevelFilter::from(cli.config.log_level))
        .parse_default_env()
        .init();

    cli.config.validate().context("Invalid configuration")?;

    match cli.command {
        Command::Run => run(cli.config).await,
        Command::Simulate {
            participants,
            stake,
        } => simulate(&cli.config, participants, &stake).await,
        Command::Verify { path } => verify(&path),
    }
}

async fn run(config: DaemonConfig) -> Result<()> {
    info!("Prize pool daemon {}", VERSION);
    info!(
        "Platform fee: {}",
        format_percent_bps(config.platform_fee_bps as u64)
    );

    let manager = Arc::new(build_manager(&config));
    let mut events = manager.events().subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!("{} events skipped", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let (shutdown, receiver) = watch::channel(false);
    let scheduler = spawn_scheduler(
        Arc::clone(&manager),
        SchedulerConfig::new(config.tick_interval(), config.history_retention_secs()),
        receiver,
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");

    shutdown
        .send(true)
        .context("Scheduler stopped unexpectedly")?;
    scheduler.await.context("Scheduler task failed")?;
    Ok(())
}

fn log_event(event: &RoundEvent) {
    if !log::log_enabled!(log::Level::Info) {
        return;
    }

    match event {
        RoundEvent::RoundExpiringSoon {
            round_id,
            seconds_remaining,
            participants,
        } => info!(
            "Round {} closes in {} ({} participants)",
            round_id,
            format_duration(*seconds_remaining),
            participants.len()
        ),
        RoundEvent::RoundCompleted {
            round_id,
            participants,
            total_pool,
            winners,
        } => info!(
            "Round {} completed: {} shared by {} participants, {} winners",
            round_id,
            format_amount_compact(*total_pool),
            participants,
            winners
        ),
        _ => match serde_json::to_string(event) {
            Ok(json) => info!("{}", json),
            Err(e) => warn!("Unprintable event for round {}: {}", event.round_id(), e),
        },
    }
}

async fn simulate(config: &DaemonConfig, participants: usize, stake: &str) -> Result<()> {
    if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&participants) {
        bail!(
            "Participants must be between {} and {}",
            MIN_PARTICIPANTS,
            MAX_PARTICIPANTS
        );
    }
    let stake = parse_amount(stake).context("Invalid stake")?;

    let record = play_round(config, participants, stake, get_current_time_in_seconds()).await?;
    let id = record.id();

    if let RoundRecord::Distributed(round) = &record {
        info!(
            "Round {}: {} paid out of {} staked",
            id,
            format_coin(round.claimed_payouts().iter().sum()),
            format_coin(round.stake.saturating_mul(round.participants as u64))
        );
        let report = verify_round(round);
        info!("{}", report.message);
    }

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

// Fill a capacity-locked round, the last join closes it
async fn play_round(
    config: &DaemonConfig,
    participants: usize,
    stake: u64,
    now: TimestampSeconds,
) -> Result<RoundRecord> {
    let manager = build_manager(config);
    let id = manager.create_round(
        CreateRoundParams::capacity_locked("participant-0", stake, participants),
        now,
    )?;

    for i in 1..participants {
        manager
            .join_round(id, format!("participant-{}", i), now)
            .await?;
    }

    manager
        .store()
        .get(id)
        .await?
        .with_context(|| format!("Round {} was not recorded", id))
}

fn verify(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let round = match serde_json::from_str::<RoundRecord>(&content) {
        Ok(RoundRecord::Distributed(round)) => round,
        Ok(RoundRecord::Cancelled(round)) => {
            bail!("Round {} was cancelled, there is nothing to verify", round.id)
        }
        Err(_) => serde_json::from_str::<DistributedRound>(&content)
            .context("File is not a distributed round record")?,
    };

    let report = verify_round(&round);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_valid {
        bail!("{}", report.message);
    }
    Ok(())
}
