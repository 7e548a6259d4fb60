//! In-process GPS stand-in: an embedded attraction catalog and uniformly
//! random user positions, with a configurable artificial latency window to
//! mimic a real positioning service.

use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use wayward_core::{Attraction, GeoPoint, VisitedLocation};

use crate::error::GpsError;
use crate::LocationProvider;

/// Latitudes are clamped to the Web-Mercator limit rather than the poles.
const LATITUDE_LIMIT: f64 = 85.051_128_78;

/// Simulated round-trip latency for a position fix.
const DEFAULT_LATENCY_MS: Range<u64> = 30..100;

/// (name, city, state, latitude, longitude) for the embedded catalog.
const CATALOG: &[(&str, &str, &str, f64, f64)] = &[
    ("Disneyland", "Anaheim", "CA", 33.817595, -117.922008),
    ("Jackson Hole", "Jackson Hole", "WY", 43.582767, -110.821999),
    ("Mojave National Preserve", "Kelso", "CA", 35.141689, -115.510399),
    (
        "Joshua Tree National Park",
        "Joshua Tree National Park",
        "CA",
        33.881866,
        -115.90065,
    ),
    ("Buffalo National River", "St Joe", "AR", 35.985512, -92.757652),
    (
        "Hot Springs National Park",
        "Hot Springs",
        "AR",
        34.52153,
        -93.042267,
    ),
    (
        "Kartchner Caverns State Park",
        "Benson",
        "AZ",
        31.837551,
        -110.347382,
    ),
    ("Legend Valley", "Thornville", "OH", 39.937778, -82.40667),
    ("Flowers Bakery of London", "London", "KY", 37.131527, -84.07486),
    ("McKinley Tower", "Anchorage", "AK", 61.218887, -149.877502),
    ("Flatiron Building", "New York City", "NY", 40.741112, -73.989723),
    ("Fallingwater", "Mill Run", "PA", 39.906113, -79.468056),
    ("Union Station", "Washington D.C.", "DC", 38.897095, -77.006332),
    ("Roger Dean Stadium", "Jupiter", "FL", 26.890959, -80.116577),
    ("Texas Memorial Stadium", "Austin", "TX", 30.283682, -97.732536),
    (
        "Bryce Canyon National Park",
        "Bryce Canyon",
        "UT",
        37.593048,
        -112.187332,
    ),
    ("Langley Speedway", "Hampton", "VA", 37.042934, -76.334694),
    ("Lincoln Memorial", "Washington D.C.", "DC", 38.889269, -77.050176),
    ("Zoo Tampa at Lowry Park", "Tampa", "FL", 28.012804, -82.469269),
    ("Franklin Park Zoo", "Boston", "MA", 42.302601, -71.086731),
    ("El Paso Zoo", "El Paso", "TX", 31.769125, -106.44487),
    ("Kansas City Zoo", "Kansas City", "MO", 39.007504, -94.529625),
    ("Henry Doorly Zoo", "Omaha", "NE", 41.225023, -95.92599),
    (
        "San Diego Zoo Safari Park",
        "Escondido",
        "CA",
        33.09368,
        -116.99953,
    ),
    ("Zoo Atlanta", "Atlanta", "GA", 33.734904, -84.372253),
    ("Cinderella Castle", "Orlando", "FL", 28.419411, -81.5812),
];

/// In-process [`LocationProvider`].
///
/// Attraction ids are generated once at construction, so the catalog is
/// stable for the life of the simulator. Position fixes are uniformly random
/// valid coordinates.
pub struct GpsSimulator {
    catalog: Vec<Attraction>,
    latency_ms: Range<u64>,
}

impl GpsSimulator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_latency_ms(DEFAULT_LATENCY_MS)
    }

    /// Simulator that answers immediately. Intended for tests and the CLI
    /// load harness.
    #[must_use]
    pub fn without_latency() -> Self {
        Self::with_latency_ms(0..0)
    }

    /// Simulator sleeping a uniformly random duration from `latency_ms`
    /// before every position fix. An empty range disables the sleep.
    #[must_use]
    pub fn with_latency_ms(latency_ms: Range<u64>) -> Self {
        let catalog = CATALOG
            .iter()
            .map(|(name, city, state, latitude, longitude)| Attraction {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
                city: (*city).to_string(),
                state: (*state).to_string(),
                location: GeoPoint::new(*latitude, *longitude),
            })
            .collect();
        Self { catalog, latency_ms }
    }

    /// A uniformly random coordinate within the simulator's valid bounds.
    ///
    /// Also used by test-population seeding to fabricate location history.
    #[must_use]
    pub fn random_location() -> GeoPoint {
        let mut rng = rand::rng();
        GeoPoint::new(
            rng.random_range(-LATITUDE_LIMIT..=LATITUDE_LIMIT),
            rng.random_range(-180.0..=180.0),
        )
    }

    async fn simulate_latency(&self) {
        if self.latency_ms.is_empty() {
            return;
        }
        let delay = rand::rng().random_range(self.latency_ms.clone());
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

impl Default for GpsSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationProvider for GpsSimulator {
    async fn current_location(&self, user_id: Uuid) -> Result<VisitedLocation, GpsError> {
        self.simulate_latency().await;
        Ok(VisitedLocation {
            user_id,
            location: Self::random_location(),
            visited_at: Utc::now(),
        })
    }

    async fn attractions(&self) -> Result<Vec<Attraction>, GpsError> {
        Ok(self.catalog.clone())
    }
}
