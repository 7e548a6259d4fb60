//! Trip-deal quote simulator.
//!
//! Produces a fixed-size slate of offers from named providers, priced off the
//! party size and trip length with the user's cumulative reward points taken
//! off the top. Offers are deterministic for a given (api key, user, points)
//! triple so repeated quotes agree.

use std::ops::Range;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use wayward_core::TripOffer;

/// Offers returned per quote.
const OFFERS_PER_QUOTE: usize = 5;

/// Simulated round-trip latency for a quote.
const DEFAULT_LATENCY_MS: Range<u64> = 1..200;

const PROVIDERS: &[&str] = &[
    "Holiday Travels",
    "Enterprize Ventures Limited",
    "Sunny Days",
    "FlyAway Trips",
    "United Partners Vacations",
    "Dream Trips",
    "Live Free",
    "Dancing Waves Cruise Lines",
    "AdventureCo",
    "Cure-Your-Blues",
    "Lastminute.com",
    "Thrifty Cruises",
];

/// In-process trip-deal quote service.
pub struct TripPricer {
    latency_ms: Range<u64>,
}

impl TripPricer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_latency_ms(DEFAULT_LATENCY_MS)
    }

    /// Pricer that answers immediately. Intended for tests and the CLI
    /// load harness.
    #[must_use]
    pub fn without_latency() -> Self {
        Self::with_latency_ms(0..0)
    }

    /// Pricer sleeping a uniformly random duration from `latency_ms` before
    /// every quote. An empty range disables the sleep.
    #[must_use]
    pub fn with_latency_ms(latency_ms: Range<u64>) -> Self {
        Self { latency_ms }
    }

    /// Quotes [`OFFERS_PER_QUOTE`] trip offers for the given party.
    ///
    /// `reward_points` is subtracted from every gross price; offers never
    /// drop below the 0.99 floor. Each provider appears at most once per
    /// quote.
    pub async fn get_price(
        &self,
        api_key: &str,
        user_id: Uuid,
        adults: u32,
        children: u32,
        nights: u32,
        reward_points: i32,
    ) -> Vec<TripOffer> {
        self.simulate_latency().await;

        let mut rng = Self::quote_rng(api_key, user_id, reward_points);

        let mut names: Vec<&str> = PROVIDERS.to_vec();
        names.shuffle(&mut rng);

        let floor = Decimal::new(99, 2);
        // Children ride at 34 % of the adult nightly rate.
        let children_rate = Decimal::new(34, 2);
        let nights = Decimal::from(nights);

        names
            .into_iter()
            .take(OFFERS_PER_QUOTE)
            .map(|provider| {
                let nightly = Decimal::from(rng.random_range(100..700u32));
                let gross = nightly * Decimal::from(adults) * nights
                    + nightly * children_rate * Decimal::from(children) * nights;
                let price = std::cmp::max(gross - Decimal::from(reward_points), floor);

                let trip_id: [u8; 16] = rng.random();
                TripOffer {
                    provider: provider.to_string(),
                    trip_id: Uuid::from_bytes(trip_id),
                    price,
                }
            })
            .collect()
    }

    fn quote_rng(api_key: &str, user_id: Uuid, reward_points: i32) -> StdRng {
        let mut hasher = Sha256::new();
        hasher.update(api_key.as_bytes());
        hasher.update(user_id.as_bytes());
        hasher.update(reward_points.to_be_bytes());
        let digest = hasher.finalize();
        let seed = u64::from_be_bytes([
            digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
        ]);
        StdRng::seed_from_u64(seed)
    }

    async fn simulate_latency(&self) {
        if self.latency_ms.is_empty() {
            return;
        }
        let delay = rand::rng().random_range(self.latency_ms.clone());
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

impl Default for TripPricer {
    fn default() -> Self {
        Self::new()
    }
}
