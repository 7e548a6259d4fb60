use super::*;

use chrono::Utc;
use rust_decimal::Decimal;

use wayward_gps::{GpsSimulator, LocationProvider};
use wayward_pricing::RewardCentral;
use wayward_tracking::{RewardEngine, TrackerConfig};

async fn service_stack() -> (Arc<UserStore>, Arc<GuideService>) {
    let store = Arc::new(UserStore::new());
    let gps = Arc::new(GpsSimulator::without_latency());
    let catalog: Arc<[Attraction]> = gps.attractions().await.unwrap().into();
    let points: Arc<dyn RewardPointsProvider> = Arc::new(RewardCentral::without_latency());
    let engine = Arc::new(RewardEngine::new(Arc::clone(&points), 8));
    let tracker = Arc::new(Tracker::new(
        Arc::clone(&store),
        gps,
        engine,
        Arc::clone(&catalog),
        TrackerConfig::default(),
    ));
    let service = Arc::new(GuideService::new(
        Arc::clone(&store),
        tracker,
        points,
        TripPricer::without_latency(),
        catalog,
        "test-server-api-key".to_owned(),
    ));
    (store, service)
}

fn disneyland() -> GeoPoint {
    GeoPoint::new(33.817_595, -117.922_008)
}

async fn place_user_at(user: &TrackedUser, location: GeoPoint) {
    user.add_visited_location(VisitedLocation {
        user_id: user.user_id,
        location,
        visited_at: Utc::now(),
    })
    .await;
}

#[tokio::test]
async fn unknown_user_is_rejected_everywhere() {
    let (_store, service) = service_stack().await;

    assert!(matches!(
        service.user_location("ghost").await,
        Err(ServiceError::UnknownUser { .. })
    ));
    assert!(matches!(
        service.track_user("ghost").await,
        Err(ServiceError::UnknownUser { .. })
    ));
    assert!(matches!(
        service.nearby_attractions("ghost").await,
        Err(ServiceError::UnknownUser { .. })
    ));
    assert!(matches!(
        service.user_rewards("ghost").await,
        Err(ServiceError::UnknownUser { .. })
    ));
    assert!(matches!(
        service.trip_deals("ghost").await,
        Err(ServiceError::UnknownUser { .. })
    ));
}

#[tokio::test]
async fn user_location_tracks_when_history_is_empty() {
    let (store, service) = service_stack().await;
    service.add_user("jon", "jon@wayward.com").await;

    let location = service.user_location("jon").await.unwrap();

    let jon = store.user("jon").await.unwrap();
    assert_eq!(location.user_id, jon.user_id);
    assert!(location.location.is_valid());
    assert_eq!(jon.visit_count().await, 1);
}

#[tokio::test]
async fn user_location_prefers_recorded_history() {
    let (store, service) = service_stack().await;
    let jon = service.add_user("jon", "jon@wayward.com").await;
    place_user_at(&jon, disneyland()).await;

    let location = service.user_location("jon").await.unwrap();

    assert_eq!(location.location, disneyland());
    // No tracking cycle was needed.
    assert_eq!(store.user("jon").await.unwrap().visit_count().await, 1);
}

#[tokio::test]
async fn track_user_runs_one_cycle() {
    let (store, service) = service_stack().await;
    service.add_user("jon", "jon@wayward.com").await;

    let outcome = service.track_user("jon").await.unwrap();

    assert!(outcome.location.location.is_valid());
    assert_eq!(store.user("jon").await.unwrap().visit_count().await, 1);
}

#[tokio::test]
async fn nearby_returns_five_ascending_with_points() {
    let (_store, service) = service_stack().await;
    let jon = service.add_user("jon", "jon@wayward.com").await;
    place_user_at(&jon, disneyland()).await;

    let nearby = service.nearby_attractions("jon").await.unwrap();

    assert_eq!(nearby.user_location, disneyland());
    assert_eq!(nearby.attractions.len(), NEARBY_ATTRACTION_COUNT);
    assert_eq!(nearby.attractions[0].attraction.name, "Disneyland");
    assert!(nearby.attractions[0].distance_miles < 0.1);
    for pair in nearby.attractions.windows(2) {
        assert!(pair[0].distance_miles <= pair[1].distance_miles);
    }
    for entry in &nearby.attractions {
        assert!((1..=1000).contains(&entry.reward_points));
    }
}

#[tokio::test]
async fn rewards_start_empty() {
    let (_store, service) = service_stack().await;
    service.add_user("jon", "jon@wayward.com").await;

    assert!(service.user_rewards("jon").await.unwrap().is_empty());
}

#[tokio::test]
async fn trip_deals_quote_and_persist_on_the_user() {
    let (store, service) = service_stack().await;
    service.add_user("jon", "jon@wayward.com").await;

    let offers = service.trip_deals("jon").await.unwrap();

    assert_eq!(offers.len(), 5);
    let floor = Decimal::new(99, 2);
    assert!(offers.iter().all(|o| o.price >= floor));

    let stored = store.user("jon").await.unwrap().trip_deals().await;
    assert_eq!(stored.len(), offers.len());
    assert!(stored
        .iter()
        .zip(&offers)
        .all(|(a, b)| a.trip_id == b.trip_id && a.provider == b.provider));
}
