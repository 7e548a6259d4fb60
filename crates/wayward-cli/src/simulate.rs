//! Load simulation handlers.
//!
//! Both simulations run entirely in-process against the zero-latency
//! simulators, so the numbers they print measure the tracking and reward
//! machinery itself rather than provider sleep time. A simulation exits
//! nonzero when its coverage check fails.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use clap::Subcommand;
use futures::stream::{self, StreamExt};

use wayward_core::{Attraction, VisitedLocation};
use wayward_gps::{GpsSimulator, LocationProvider};
use wayward_pricing::RewardCentral;
use wayward_tracking::{RewardEngine, Tracker, TrackerConfig, UserStore};

/// Reward-evaluation fan-out ceiling used by the track simulation.
const REWARDS_CEILING: usize = 16;

#[derive(Debug, Subcommand)]
pub(crate) enum SimulateCommands {
    /// Register users and drive full tracking ticks over them
    Track {
        /// Number of users to simulate
        #[arg(long, default_value_t = 100)]
        users: usize,

        /// Fan-out ceiling for concurrent user cycles
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        /// Tick passes to run
        #[arg(long, default_value_t = 1)]
        ticks: usize,
    },
    /// Place every user at an attraction and run one reward pass per user
    Rewards {
        /// Number of users to simulate
        #[arg(long, default_value_t = 100)]
        users: usize,

        /// Fan-out ceiling for concurrent reward passes
        #[arg(long, default_value_t = 16)]
        concurrency: usize,
    },
}

pub(crate) async fn run(command: SimulateCommands) -> anyhow::Result<()> {
    match command {
        SimulateCommands::Track {
            users,
            concurrency,
            ticks,
        } => run_track(users, concurrency, ticks).await,
        SimulateCommands::Rewards { users, concurrency } => run_rewards(users, concurrency).await,
    }
}

/// Registers `users` simulated users and runs `ticks` full tracking passes,
/// printing per-tick stats and the overall elapsed time.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or any user ends the run
/// with fewer recorded visits than ticks.
pub(crate) async fn run_track(
    users: usize,
    concurrency: usize,
    ticks: usize,
) -> anyhow::Result<()> {
    let store = Arc::new(UserStore::new());
    for i in 0..users {
        store
            .add_user(&format!("simUser{i}"), &format!("simUser{i}@wayward.com"))
            .await;
    }

    let gps = Arc::new(GpsSimulator::without_latency());
    let catalog: Arc<[Attraction]> = gps.attractions().await?.into();
    let engine = Arc::new(RewardEngine::new(
        Arc::new(RewardCentral::without_latency()),
        REWARDS_CEILING,
    ));
    let tracker = Tracker::new(
        Arc::clone(&store),
        gps,
        engine,
        catalog,
        TrackerConfig {
            interval: std::time::Duration::from_secs(3600),
            max_concurrent_users: concurrency,
        },
    );

    let started = Instant::now();
    for tick in 1..=ticks {
        let summary = tracker.track_all_users().await;
        println!(
            "tick {tick}: tracked {} users, {} failed, {} rewards granted in {:?}",
            summary.tracked, summary.failed, summary.rewards_granted, summary.elapsed
        );
        if summary.failed > 0 {
            tracing::warn!(
                failed = summary.failed,
                total_users = users,
                tick,
                "some users failed during the tick"
            );
        }
    }
    println!(
        "tracked {users} users for {ticks} ticks in {:?}",
        started.elapsed()
    );

    let mut shortfall = 0usize;
    for user in store.all_users().await {
        if user.visit_count().await < ticks {
            shortfall += 1;
        }
    }
    anyhow::ensure!(
        shortfall == 0,
        "{shortfall} of {users} users were not tracked every tick"
    );
    Ok(())
}

/// Places every user at the catalog's first attraction and runs one reward
/// pass per user with bounded fan-out. Every user must end the run with at
/// least one reward.
///
/// # Errors
///
/// Returns an error if the catalog is empty, cannot be loaded, or any user
/// earns no reward.
pub(crate) async fn run_rewards(users: usize, concurrency: usize) -> anyhow::Result<()> {
    let gps = GpsSimulator::without_latency();
    let catalog: Arc<[Attraction]> = gps.attractions().await?.into();
    anyhow::ensure!(!catalog.is_empty(), "simulator catalog is empty");
    let first = catalog[0].clone();

    let store = Arc::new(UserStore::new());
    for i in 0..users {
        let user = store
            .add_user(&format!("simUser{i}"), &format!("simUser{i}@wayward.com"))
            .await;
        user.add_visited_location(VisitedLocation {
            user_id: user.user_id,
            location: first.location,
            visited_at: Utc::now(),
        })
        .await;
    }

    let engine = RewardEngine::new(Arc::new(RewardCentral::without_latency()), REWARDS_CEILING);

    let started = Instant::now();
    let all = store.all_users().await;
    let granted: Vec<usize> = stream::iter(&all)
        .map(|user| {
            let engine = &engine;
            let catalog = Arc::clone(&catalog);
            async move { engine.calculate_rewards(user, &catalog).await }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;
    let granted: usize = granted.iter().sum();

    println!(
        "granted {granted} rewards across {users} users in {:?}",
        started.elapsed()
    );

    let mut unrewarded = 0usize;
    for user in &all {
        if user.reward_count().await == 0 {
            unrewarded += 1;
        }
    }
    anyhow::ensure!(
        unrewarded == 0,
        "{unrewarded} of {users} users earned no reward"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn track_simulation_covers_every_user() {
        run_track(5, 2, 2).await.expect("simulation should pass");
    }

    #[tokio::test]
    async fn rewards_simulation_rewards_every_user() {
        run_rewards(5, 2).await.expect("simulation should pass");
    }
}
