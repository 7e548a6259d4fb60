//! Location tracking and reward evaluation for Wayward.
//!
//! Holds the in-memory user location store, the proximity reward engine, and
//! the background tracker that polls every registered user on a fixed cadence.
//! Position fetches and reward fan-out both run with bounded concurrency, and
//! reward grants are deduplicated per (user, attraction) pair at the store.

pub mod rewards;
pub mod seed;
pub mod store;
pub mod tracker;

pub use rewards::{RewardEngine, ATTRACTION_PROXIMITY_RANGE_MILES, DEFAULT_PROXIMITY_BUFFER_MILES};
pub use seed::{seed_internal_users, SEED_VISITS_PER_USER};
pub use store::{TrackedUser, UserStore};
pub use tracker::{CycleOutcome, TickSummary, Tracker, TrackerConfig};
