//! The guide service: a thin facade the HTTP handlers call into.
//!
//! Composes the store, tracker, and external providers behind user-name
//! keyed operations. Holds no state of its own beyond provider handles, so
//! every invariant lives in the layers underneath.

use std::sync::Arc;

use thiserror::Error;

use wayward_core::{geo, Attraction, GeoPoint, TripOffer, UserReward, VisitedLocation};
use wayward_gps::GpsError;
use wayward_pricing::{PricingError, RewardPointsProvider, TripPricer};
use wayward_tracking::{CycleOutcome, TrackedUser, Tracker, UserStore};

/// Attractions returned by a nearby query, regardless of distance.
pub const NEARBY_ATTRACTION_COUNT: usize = 5;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no tracked user named '{user_name}'")]
    UnknownUser { user_name: String },

    #[error("location provider error: {0}")]
    Gps(#[from] GpsError),

    #[error("pricing provider error: {0}")]
    Pricing(#[from] PricingError),
}

/// One attraction from a nearby query, enriched with the caller's distance
/// to it and the reward points the pair would earn.
pub struct NearbyAttraction {
    pub attraction: Attraction,
    pub distance_miles: f64,
    pub reward_points: i32,
}

pub struct NearbyAttractions {
    pub user_location: GeoPoint,
    pub attractions: Vec<NearbyAttraction>,
}

pub struct GuideService {
    store: Arc<UserStore>,
    tracker: Arc<Tracker>,
    points: Arc<dyn RewardPointsProvider>,
    pricer: TripPricer,
    catalog: Arc<[Attraction]>,
    trip_pricer_api_key: String,
}

impl GuideService {
    pub fn new(
        store: Arc<UserStore>,
        tracker: Arc<Tracker>,
        points: Arc<dyn RewardPointsProvider>,
        pricer: TripPricer,
        catalog: Arc<[Attraction]>,
        trip_pricer_api_key: String,
    ) -> Self {
        Self {
            store,
            tracker,
            points,
            pricer,
            catalog,
            trip_pricer_api_key,
        }
    }

    pub async fn add_user(&self, user_name: &str, email: &str) -> Arc<TrackedUser> {
        self.store.add_user(user_name, email).await
    }

    pub async fn user_count(&self) -> usize {
        self.store.user_count().await
    }

    pub async fn tracker_running(&self) -> bool {
        self.tracker.is_running().await
    }

    async fn resolve(&self, user_name: &str) -> Result<Arc<TrackedUser>, ServiceError> {
        self.store
            .user(user_name)
            .await
            .ok_or_else(|| ServiceError::UnknownUser {
                user_name: user_name.to_owned(),
            })
    }

    /// The user's most recent known position. A user with no history yet
    /// gets an immediate tracking cycle instead of an error.
    ///
    /// # Errors
    ///
    /// [`ServiceError::UnknownUser`] for unregistered names; [`ServiceError::Gps`]
    /// when the fallback cycle cannot fetch a position.
    pub async fn user_location(&self, user_name: &str) -> Result<VisitedLocation, ServiceError> {
        let user = self.resolve(user_name).await?;
        if let Some(last) = user.last_visited_location().await {
            return Ok(last);
        }
        let outcome = self.tracker.track_user(&user).await?;
        Ok(outcome.location)
    }

    /// Runs one on-demand tracking cycle for the user.
    ///
    /// # Errors
    ///
    /// [`ServiceError::UnknownUser`] or [`ServiceError::Gps`].
    pub async fn track_user(&self, user_name: &str) -> Result<CycleOutcome, ServiceError> {
        let user = self.resolve(user_name).await?;
        Ok(self.tracker.track_user(&user).await?)
    }

    /// The closest [`NEARBY_ATTRACTION_COUNT`] attractions to the user's
    /// position, ascending by distance, each with the reward points the
    /// pair would earn.
    ///
    /// # Errors
    ///
    /// [`ServiceError::UnknownUser`], [`ServiceError::Gps`] (position
    /// fallback), or [`ServiceError::Pricing`] (points lookup).
    pub async fn nearby_attractions(
        &self,
        user_name: &str,
    ) -> Result<NearbyAttractions, ServiceError> {
        let user = self.resolve(user_name).await?;
        let origin = match user.last_visited_location().await {
            Some(last) => last,
            None => self.tracker.track_user(&user).await?.location,
        };

        let ranked =
            geo::nearest_attractions(origin.location, &self.catalog, NEARBY_ATTRACTION_COUNT);
        let mut attractions = Vec::with_capacity(ranked.len());
        for (attraction, distance_miles) in ranked {
            let reward_points = self.points.reward_points(attraction.id, user.user_id).await?;
            attractions.push(NearbyAttraction {
                attraction,
                distance_miles,
                reward_points,
            });
        }

        Ok(NearbyAttractions {
            user_location: origin.location,
            attractions,
        })
    }

    /// # Errors
    ///
    /// [`ServiceError::UnknownUser`] for unregistered names.
    pub async fn user_rewards(&self, user_name: &str) -> Result<Vec<UserReward>, ServiceError> {
        let user = self.resolve(user_name).await?;
        Ok(user.rewards().await)
    }

    /// Quotes trip deals priced off the user's cumulative reward points and
    /// travel preferences, and stores the slate on the user.
    ///
    /// # Errors
    ///
    /// [`ServiceError::UnknownUser`] for unregistered names.
    pub async fn trip_deals(&self, user_name: &str) -> Result<Vec<TripOffer>, ServiceError> {
        let user = self.resolve(user_name).await?;
        let preferences = user.travel_preferences().await;
        let points = user.cumulative_reward_points().await;

        let offers = self
            .pricer
            .get_price(
                &self.trip_pricer_api_key,
                user.user_id,
                preferences.adults,
                preferences.children,
                preferences.trip_duration_days,
                points,
            )
            .await;
        user.set_trip_deals(offers.clone()).await;
        Ok(offers)
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
