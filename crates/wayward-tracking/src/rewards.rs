//! Concurrent reward evaluation.
//!
//! One [`RewardEngine::calculate_rewards`] call evaluates a user against the
//! whole attraction catalog with a bounded fan-out, grants a reward per newly
//! qualifying attraction, and returns only after every in-flight evaluation
//! has finished. Duplicate grants are structurally impossible: the store's
//! insert-if-absent is the single write path.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use wayward_core::{geo, Attraction, GeoPoint, UserReward, VisitedLocation};
use wayward_pricing::{PricingError, RewardPointsProvider};

use crate::store::TrackedUser;

/// Reward qualification threshold when none is configured.
pub const DEFAULT_PROXIMITY_BUFFER_MILES: i32 = 10;

/// Fixed coarse range for "anywhere near this attraction at all". Evaluation
/// skips attractions beyond both this and the reward buffer.
pub const ATTRACTION_PROXIMITY_RANGE_MILES: i32 = 200;

/// Outcome of evaluating a single attraction for one user.
enum RewardOutcome {
    Granted,
    NotQualified,
    /// Another in-flight cycle granted the same pair first.
    AlreadyGranted,
    ProviderFailed(PricingError),
}

/// Evaluates (user, attraction) pairs and appends newly earned rewards.
///
/// The proximity buffer is shared runtime configuration: writes are rare and
/// workers read a per-call snapshot, so a call that overlaps a buffer change
/// may use the directly preceding value.
pub struct RewardEngine {
    points: Arc<dyn RewardPointsProvider>,
    proximity_buffer_miles: AtomicI32,
    max_concurrent: usize,
}

impl RewardEngine {
    /// Creates an engine evaluating at most `max_concurrent` attractions at
    /// a time per call.
    #[must_use]
    pub fn new(points: Arc<dyn RewardPointsProvider>, max_concurrent: usize) -> Self {
        Self {
            points,
            proximity_buffer_miles: AtomicI32::new(DEFAULT_PROXIMITY_BUFFER_MILES),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Replaces the reward qualification threshold. Takes effect for
    /// subsequent evaluations only; nothing is recomputed retroactively.
    pub fn set_proximity_buffer(&self, miles: i32) {
        self.proximity_buffer_miles.store(miles, Ordering::Relaxed);
        tracing::debug!(miles, "proximity buffer updated");
    }

    pub fn set_default_proximity_buffer(&self) {
        self.set_proximity_buffer(DEFAULT_PROXIMITY_BUFFER_MILES);
    }

    #[must_use]
    pub fn proximity_buffer(&self) -> i32 {
        self.proximity_buffer_miles.load(Ordering::Relaxed)
    }

    /// Coarse test against the fixed attraction range, independent of the
    /// reward buffer.
    #[must_use]
    pub fn is_within_attraction_proximity(
        &self,
        attraction: &Attraction,
        location: GeoPoint,
    ) -> bool {
        geo::is_within_range(
            attraction.location,
            location,
            f64::from(ATTRACTION_PROXIMITY_RANGE_MILES),
        )
    }

    /// Evaluates `user` against `catalog` and grants rewards for newly
    /// qualifying attractions. Returns the number of rewards granted by this
    /// call.
    ///
    /// The user's most recent visited location is the position under test; a
    /// user with no recorded history is a no-op, as is an empty catalog.
    /// Attractions the user already holds a reward for are skipped before
    /// dispatch. A provider failure for one attraction is logged and skipped
    /// without disturbing its siblings; the attraction stays eligible for a
    /// later pass.
    pub async fn calculate_rewards(&self, user: &TrackedUser, catalog: &[Attraction]) -> usize {
        if catalog.is_empty() {
            return 0;
        }
        let Some(visit) = user.last_visited_location().await else {
            return 0;
        };

        let rewarded = user.rewarded_attractions().await;
        // One snapshot per call so every worker tests the same threshold.
        let buffer_miles = f64::from(self.proximity_buffer());
        let gate_miles = buffer_miles.max(f64::from(ATTRACTION_PROXIMITY_RANGE_MILES));

        let candidates: Vec<&Attraction> = catalog
            .iter()
            .filter(|a| !rewarded.contains(&a.id))
            .filter(|a| geo::is_within_range(a.location, visit.location, gate_miles))
            .collect();
        if candidates.is_empty() {
            return 0;
        }

        // Futures are built eagerly instead of inside a stream `map` closure:
        // a closure over `&Attraction` items trips rustc's higher-ranked
        // lifetime check (rust-lang/rust#102211) once this future is spawned.
        let evaluations: Vec<_> = candidates
            .into_iter()
            .map(|attraction| {
                let eval = self.evaluate(user, attraction, visit, buffer_miles);
                async move { (attraction, eval.await) }
            })
            .collect();
        let results: Vec<(&Attraction, RewardOutcome)> = stream::iter(evaluations)
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut granted = 0usize;
        let mut failed = 0usize;
        for (attraction, outcome) in results {
            match outcome {
                RewardOutcome::Granted => granted += 1,
                RewardOutcome::NotQualified | RewardOutcome::AlreadyGranted => {}
                RewardOutcome::ProviderFailed(e) => {
                    tracing::warn!(
                        user = %user.user_name,
                        attraction = %attraction.name,
                        error = %e,
                        "reward points lookup failed; attraction skipped this pass"
                    );
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            tracing::warn!(
                user = %user.user_name,
                failed,
                "some attractions failed reward evaluation"
            );
        }
        granted
    }

    async fn evaluate(
        &self,
        user: &TrackedUser,
        attraction: &Attraction,
        visit: VisitedLocation,
        buffer_miles: f64,
    ) -> RewardOutcome {
        if !geo::is_within_range(attraction.location, visit.location, buffer_miles) {
            return RewardOutcome::NotQualified;
        }

        match self.points.reward_points(attraction.id, user.user_id).await {
            Ok(points) => {
                let reward = UserReward {
                    user_id: user.user_id,
                    attraction_id: attraction.id,
                    attraction_name: attraction.name.clone(),
                    points,
                };
                if user.add_reward_if_absent(reward).await {
                    RewardOutcome::Granted
                } else {
                    RewardOutcome::AlreadyGranted
                }
            }
            Err(e) => RewardOutcome::ProviderFailed(e),
        }
    }
}

#[cfg(test)]
#[path = "rewards_test.rs"]
mod tests;
