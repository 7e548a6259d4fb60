use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod geo;

mod app_config;
mod config;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};

/// A geographic coordinate in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when latitude is within [-90, 90] and longitude within [-180, 180].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attraction {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub state: String,
    pub location: GeoPoint,
}

/// One recorded position for a user. Immutable once created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VisitedLocation {
    pub user_id: Uuid,
    pub location: GeoPoint,
    pub visited_at: DateTime<Utc>,
}

/// A granted reward. At most one exists per (user, attraction) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReward {
    pub user_id: Uuid,
    pub attraction_id: Uuid,
    pub attraction_name: String,
    pub points: i32,
}

/// Trip-sizing preferences consumed by the trip pricer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TravelPreferences {
    pub adults: u32,
    pub children: u32,
    pub trip_duration_days: u32,
}

impl Default for TravelPreferences {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            trip_duration_days: 1,
        }
    }
}

/// One priced trip offer from a named provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripOffer {
    pub provider: String,
    pub trip_id: Uuid,
    pub price: Decimal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
