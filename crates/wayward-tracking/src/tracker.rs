//! The background tracking scheduler.
//!
//! A single loop task drives ticks on a fixed interval. Each tick snapshots
//! the user registry and fans per-user tracking cycles out with a bounded
//! concurrency ceiling; the fan-out is awaited inside the loop, so ticks
//! never overlap and no user ever has two scheduler-driven cycles in flight
//! at once. An overrunning tick delays the next one rather than bursting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use wayward_core::{Attraction, VisitedLocation};
use wayward_gps::{GpsError, LocationProvider};

use crate::rewards::RewardEngine;
use crate::store::{TrackedUser, UserStore};

/// Interval and fan-out ceiling, fixed at construction.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub interval: Duration,
    pub max_concurrent_users: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            max_concurrent_users: 8,
        }
    }
}

/// One completed tracking cycle for a single user.
pub struct CycleOutcome {
    pub location: VisitedLocation,
    pub rewards_granted: usize,
}

/// Aggregate result of one tick across all users.
#[derive(Debug)]
pub struct TickSummary {
    pub tracked: usize,
    pub failed: usize,
    pub rewards_granted: usize,
    pub elapsed: Duration,
}

struct TrackerRuntime {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Background scheduler polling every known user on a fixed cadence.
///
/// Lifecycle is `start` / `stop_tracking`, both idempotent and callable from
/// any task. Stopping cancels the loop promptly but lets the in-flight tick
/// drain; callers needing a hard deadline wrap `stop_tracking` in a timeout.
pub struct Tracker {
    store: Arc<UserStore>,
    gps: Arc<dyn LocationProvider>,
    engine: Arc<RewardEngine>,
    catalog: Arc<[Attraction]>,
    config: TrackerConfig,
    runtime: Mutex<Option<TrackerRuntime>>,
}

impl Tracker {
    #[must_use]
    pub fn new(
        store: Arc<UserStore>,
        gps: Arc<dyn LocationProvider>,
        engine: Arc<RewardEngine>,
        catalog: Arc<[Attraction]>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            store,
            gps,
            engine,
            catalog,
            config,
            runtime: Mutex::new(None),
        }
    }

    /// Begins the periodic tracking loop. A no-op if already running.
    ///
    /// The first tick fires immediately, then every `config.interval`.
    pub async fn start(self: &Arc<Self>) {
        let mut runtime = self.runtime.lock().await;
        if runtime.is_some() {
            tracing::debug!("start requested but tracker is already running");
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Self::run_loop(Arc::clone(self), cancel.clone()));
        *runtime = Some(TrackerRuntime { cancel, handle });

        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            max_concurrent_users = self.config.max_concurrent_users,
            "tracker started"
        );
    }

    /// Stops the loop and waits for the in-flight tick to drain.
    ///
    /// Safe to call repeatedly and from any task; a stop with no tracker
    /// running is a no-op. After return the tracker can be started again.
    pub async fn stop_tracking(&self) {
        let runtime = self.runtime.lock().await.take();
        match runtime {
            Some(rt) => {
                rt.cancel.cancel();
                if let Err(e) = rt.handle.await {
                    tracing::warn!(error = %e, "tracker loop task ended abnormally");
                }
                tracing::info!("tracker stopped");
            }
            None => {
                tracing::debug!("stop requested but tracker is not running");
            }
        }
    }

    pub async fn is_running(&self) -> bool {
        self.runtime.lock().await.is_some()
    }

    async fn run_loop(self: Arc<Self>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("tracker loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let summary = self.track_all_users().await;
                    tracing::info!(
                        tracked = summary.tracked,
                        failed = summary.failed,
                        rewards_granted = summary.rewards_granted,
                        elapsed = ?summary.elapsed,
                        "tracking tick complete"
                    );
                }
            }
        }
    }

    /// Runs one full tick: every registered user gets a tracking cycle, at
    /// most `max_concurrent_users` in flight at a time. Also the entry point
    /// for one-shot passes from tests and the simulation harness.
    pub async fn track_all_users(&self) -> TickSummary {
        let started = Instant::now();
        let users = self.store.all_users().await;

        let results: Vec<(Arc<TrackedUser>, Result<CycleOutcome, GpsError>)> =
            stream::iter(users)
                .map(|user| async move {
                    let outcome = self.track_user(&user).await;
                    (user, outcome)
                })
                .buffer_unordered(self.config.max_concurrent_users.max(1))
                .collect()
                .await;

        let mut tracked = 0usize;
        let mut failed = 0usize;
        let mut rewards_granted = 0usize;
        for (user, outcome) in results {
            match outcome {
                Ok(cycle) => {
                    tracked += 1;
                    rewards_granted += cycle.rewards_granted;
                }
                Err(e) => {
                    tracing::warn!(
                        user = %user.user_name,
                        error = %e,
                        "failed to track user this tick"
                    );
                    failed += 1;
                }
            }
        }

        TickSummary {
            tracked,
            failed,
            rewards_granted,
            elapsed: started.elapsed(),
        }
    }

    /// One tracking cycle: fetch the user's position, append it to history,
    /// then evaluate rewards. The append always lands before the evaluation,
    /// so the evaluation sees at least the location just added.
    ///
    /// # Errors
    ///
    /// Returns [`GpsError`] when the position fetch fails; the user's state
    /// is untouched in that case.
    pub async fn track_user(&self, user: &TrackedUser) -> Result<CycleOutcome, GpsError> {
        let location = self.gps.current_location(user.user_id).await?;
        user.add_visited_location(location).await;
        let rewards_granted = self.engine.calculate_rewards(user, &self.catalog).await;
        Ok(CycleOutcome {
            location,
            rewards_granted,
        })
    }
}

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;
