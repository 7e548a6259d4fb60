//! Pricing collaborators: the reward-points provider the reward engine calls
//! per (attraction, user) pair, and the trip pricer behind trip-deal lookups.

use async_trait::async_trait;
use uuid::Uuid;

mod error;
mod reward_central;
mod trip_pricer;

pub use error::PricingError;
pub use reward_central::RewardCentral;
pub use trip_pricer::TripPricer;

/// Computes the reward-point value for a (attraction, user) pair.
///
/// Implementations must be deterministic per pair: the engine may re-request
/// a value after a transient failure and the grant must not change.
#[async_trait]
pub trait RewardPointsProvider: Send + Sync {
    async fn reward_points(&self, attraction_id: Uuid, user_id: Uuid)
        -> Result<i32, PricingError>;
}
