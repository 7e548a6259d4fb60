//! Reward-points simulator.
//!
//! The real service this stands in for drew a random value per call, which
//! made re-grants unauditable; here the value is derived from a digest of the
//! (attraction, user) pair so every call for the same pair agrees.

use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::PricingError;
use crate::RewardPointsProvider;

/// Simulated round-trip latency for a points lookup.
const DEFAULT_LATENCY_MS: Range<u64> = 1..1000;

/// In-process [`RewardPointsProvider`] granting 1 to 1000 points per pair.
pub struct RewardCentral {
    latency_ms: Range<u64>,
}

impl RewardCentral {
    #[must_use]
    pub fn new() -> Self {
        Self::with_latency_ms(DEFAULT_LATENCY_MS)
    }

    /// Provider that answers immediately. Intended for tests and the CLI
    /// load harness.
    #[must_use]
    pub fn without_latency() -> Self {
        Self::with_latency_ms(0..0)
    }

    /// Provider sleeping a uniformly random duration from `latency_ms`
    /// before every lookup. An empty range disables the sleep.
    #[must_use]
    pub fn with_latency_ms(latency_ms: Range<u64>) -> Self {
        Self { latency_ms }
    }

    fn derive_points(attraction_id: Uuid, user_id: Uuid) -> i32 {
        let mut hasher = Sha256::new();
        hasher.update(attraction_id.as_bytes());
        hasher.update(user_id.as_bytes());
        let digest = hasher.finalize();
        let raw = u16::from_be_bytes([digest[0], digest[1]]);
        i32::from(raw % 1000) + 1
    }

    async fn simulate_latency(&self) {
        if self.latency_ms.is_empty() {
            return;
        }
        let delay = rand::rng().random_range(self.latency_ms.clone());
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

impl Default for RewardCentral {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RewardPointsProvider for RewardCentral {
    async fn reward_points(
        &self,
        attraction_id: Uuid,
        user_id: Uuid,
    ) -> Result<i32, PricingError> {
        self.simulate_latency().await;
        Ok(Self::derive_points(attraction_id, user_id))
    }
}
