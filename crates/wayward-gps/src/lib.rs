//! Location provider seam: the trait the tracking core polls, plus the two
//! implementations, an HTTP client for a remote GPS service and an in-process
//! simulator with an embedded attraction catalog.

use async_trait::async_trait;
use uuid::Uuid;

use wayward_core::{Attraction, VisitedLocation};

mod client;
mod error;
mod retry;
mod simulator;

pub use client::GpsHttpClient;
pub use error::GpsError;
pub use simulator::GpsSimulator;

/// Source of user positions and the attraction catalog.
///
/// Implementations may be slow (network round-trips, simulated latency), so
/// callers must invoke them off any latency-sensitive path.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// The user's position right now, stamped with the current time.
    async fn current_location(&self, user_id: Uuid) -> Result<VisitedLocation, GpsError>;

    /// The full attraction catalog. Stable for the life of the provider.
    async fn attractions(&self) -> Result<Vec<Attraction>, GpsError>;
}
