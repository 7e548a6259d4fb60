use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use wayward_gps::{GpsSimulator, LocationProvider};
use wayward_pricing::RewardCentral;

use super::*;
use crate::store::UserStore;

fn attraction(name: &str, latitude: f64, longitude: f64) -> Attraction {
    Attraction {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        city: String::new(),
        state: String::new(),
        location: GeoPoint::new(latitude, longitude),
    }
}

async fn user_at(store: &UserStore, name: &str, location: GeoPoint) -> std::sync::Arc<TrackedUser> {
    let user = store.add_user(name, &format!("{name}@wayward.com")).await;
    user.add_visited_location(VisitedLocation {
        user_id: user.user_id,
        location,
        visited_at: Utc::now(),
    })
    .await;
    user
}

fn real_points_engine(max_concurrent: usize) -> RewardEngine {
    RewardEngine::new(Arc::new(RewardCentral::without_latency()), max_concurrent)
}

/// Fails lookups for one target attraction until healed.
struct OutageForAttraction {
    target: Uuid,
    healed: AtomicBool,
}

#[async_trait]
impl RewardPointsProvider for OutageForAttraction {
    async fn reward_points(
        &self,
        attraction_id: Uuid,
        _user_id: Uuid,
    ) -> Result<i32, PricingError> {
        if attraction_id == self.target && !self.healed.load(AtomicOrdering::SeqCst) {
            return Err(PricingError::Unavailable {
                reason: "induced outage".to_owned(),
            });
        }
        Ok(100)
    }
}

/// Tracks the high-water mark of concurrent in-flight lookups.
struct GaugedPoints {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl GaugedPoints {
    fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RewardPointsProvider for GaugedPoints {
    async fn reward_points(&self, _: Uuid, _: Uuid) -> Result<i32, PricingError> {
        let now = self.in_flight.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        self.peak.fetch_max(now, AtomicOrdering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, AtomicOrdering::SeqCst);
        Ok(42)
    }
}

#[tokio::test]
async fn grants_a_reward_at_an_attraction() {
    let store = UserStore::new();
    let catalog = vec![
        attraction("Disneyland", 33.817595, -117.922008),
        attraction("Franklin Park Zoo", 42.302601, -71.086731),
        attraction("Zoo Atlanta", 33.734904, -84.372253),
    ];
    let jon = user_at(&store, "jon", catalog[0].location).await;

    let engine = real_points_engine(4);
    let granted = engine.calculate_rewards(&jon, &catalog).await;

    assert_eq!(granted, 1);
    let rewards = jon.rewards().await;
    assert_eq!(rewards.len(), 1);
    assert_eq!(rewards[0].attraction_id, catalog[0].id);
    assert!(rewards[0].points >= 1);
}

#[tokio::test]
async fn second_pass_without_new_locations_grants_nothing() {
    let store = UserStore::new();
    let catalog = vec![attraction("Disneyland", 33.817595, -117.922008)];
    let jon = user_at(&store, "jon", catalog[0].location).await;

    let engine = real_points_engine(4);
    assert_eq!(engine.calculate_rewards(&jon, &catalog).await, 1);
    assert_eq!(engine.calculate_rewards(&jon, &catalog).await, 0);
    assert_eq!(jon.reward_count().await, 1);
}

#[tokio::test]
async fn max_buffer_grants_the_entire_catalog() {
    let store = UserStore::new();
    let gps = GpsSimulator::without_latency();
    let catalog = gps.attractions().await.unwrap();
    let jon = user_at(&store, "jon", GpsSimulator::random_location()).await;

    let engine = real_points_engine(8);
    engine.set_proximity_buffer(i32::MAX);
    let granted = engine.calculate_rewards(&jon, &catalog).await;

    assert_eq!(granted, catalog.len());
    assert_eq!(jon.reward_count().await, catalog.len());
}

#[tokio::test]
async fn zero_buffer_grants_nothing_away_from_attractions() {
    let store = UserStore::new();
    let catalog = vec![attraction("Disneyland", 33.817595, -117.922008)];
    // A mile or so down the road from the attraction.
    let jon = user_at(&store, "jon", GeoPoint::new(33.83, -117.93)).await;

    let engine = real_points_engine(4);
    engine.set_proximity_buffer(0);

    assert_eq!(engine.calculate_rewards(&jon, &catalog).await, 0);
    assert_eq!(jon.reward_count().await, 0);
}

#[tokio::test]
async fn zero_buffer_still_grants_on_exact_coincidence() {
    let store = UserStore::new();
    let catalog = vec![attraction("Disneyland", 33.817595, -117.922008)];
    let jon = user_at(&store, "jon", catalog[0].location).await;

    let engine = real_points_engine(4);
    engine.set_proximity_buffer(0);

    assert_eq!(engine.calculate_rewards(&jon, &catalog).await, 1);
}

#[tokio::test]
async fn provider_failure_is_isolated_and_recoverable() {
    let store = UserStore::new();
    let shared = GeoPoint::new(33.817595, -117.922008);
    let catalog = vec![
        attraction("first", shared.latitude, shared.longitude),
        attraction("second", shared.latitude, shared.longitude),
        attraction("third", shared.latitude, shared.longitude),
    ];
    let jon = user_at(&store, "jon", shared).await;

    let outage = Arc::new(OutageForAttraction {
        target: catalog[1].id,
        healed: AtomicBool::new(false),
    });
    let engine = RewardEngine::new(Arc::clone(&outage) as Arc<dyn RewardPointsProvider>, 4);

    // Siblings still get granted around the failing attraction.
    assert_eq!(engine.calculate_rewards(&jon, &catalog).await, 2);
    assert_eq!(jon.reward_count().await, 2);
    assert!(!jon.has_reward(catalog[1].id).await);

    // Once the provider recovers, the skipped attraction is granted.
    outage.healed.store(true, AtomicOrdering::SeqCst);
    assert_eq!(engine.calculate_rewards(&jon, &catalog).await, 1);
    assert_eq!(jon.reward_count().await, 3);
}

#[tokio::test]
async fn concurrency_ceiling_is_respected() {
    let store = UserStore::new();
    let gps = GpsSimulator::without_latency();
    let catalog = gps.attractions().await.unwrap();
    let jon = user_at(&store, "jon", GpsSimulator::random_location()).await;

    let gauge = Arc::new(GaugedPoints::new());
    let engine = RewardEngine::new(Arc::clone(&gauge) as Arc<dyn RewardPointsProvider>, 4);
    engine.set_proximity_buffer(i32::MAX);

    let granted = engine.calculate_rewards(&jon, &catalog).await;

    // Every worker finished before the call returned.
    assert_eq!(granted, catalog.len());
    assert_eq!(gauge.in_flight.load(AtomicOrdering::SeqCst), 0);
    let peak = gauge.peak.load(AtomicOrdering::SeqCst);
    assert!(peak <= 4, "peak in-flight lookups was {peak}, ceiling is 4");
}

#[tokio::test]
async fn empty_catalog_is_a_noop() {
    let store = UserStore::new();
    let jon = user_at(&store, "jon", GeoPoint::new(10.0, 10.0)).await;

    let engine = real_points_engine(4);
    assert_eq!(engine.calculate_rewards(&jon, &[]).await, 0);
}

#[tokio::test]
async fn user_without_history_is_a_noop() {
    let store = UserStore::new();
    let jon = store.add_user("jon", "jon@wayward.com").await;
    let catalog = vec![attraction("Disneyland", 33.817595, -117.922008)];

    let engine = real_points_engine(4);
    assert_eq!(engine.calculate_rewards(&jon, &catalog).await, 0);
    assert_eq!(jon.reward_count().await, 0);
}

#[tokio::test]
async fn attraction_is_within_proximity_of_itself() {
    let engine = real_points_engine(1);
    let disneyland = attraction("Disneyland", 33.817595, -117.922008);

    assert!(engine.is_within_attraction_proximity(&disneyland, disneyland.location));
    // Boston is a long way past the 200 mile range.
    assert!(!engine.is_within_attraction_proximity(&disneyland, GeoPoint::new(42.3601, -71.0589)));
}

#[tokio::test]
async fn buffer_changes_apply_to_subsequent_evaluations() {
    let store = UserStore::new();
    let catalog = vec![attraction("Disneyland", 33.817595, -117.922008)];
    // Roughly fifty miles out.
    let jon = user_at(&store, "jon", GeoPoint::new(34.3, -117.2)).await;

    let engine = real_points_engine(4);
    assert_eq!(engine.calculate_rewards(&jon, &catalog).await, 0);

    engine.set_proximity_buffer(100);
    assert_eq!(engine.calculate_rewards(&jon, &catalog).await, 1);

    engine.set_default_proximity_buffer();
    assert_eq!(engine.proximity_buffer(), DEFAULT_PROXIMITY_BUFFER_MILES);
}
