//! The user location store: per-user append-only location history, granted
//! rewards, and trip deals, behind a name-keyed registry.
//!
//! Locking discipline is one writer at a time per user: all of a user's
//! mutable state sits behind a single per-user mutex, and every read returns
//! an owned snapshot so callers can never alias store internals. The registry
//! itself is a read-write lock so scheduler ticks can enumerate users while
//! new users register.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use wayward_core::{TravelPreferences, TripOffer, UserReward, VisitedLocation};

#[derive(Default)]
struct UserState {
    visited: Vec<VisitedLocation>,
    rewards: HashMap<Uuid, UserReward>,
    trip_deals: Vec<TripOffer>,
    preferences: TravelPreferences,
}

/// One tracked user. Identity fields are immutable; everything that mutates
/// lives in the state mutex.
pub struct TrackedUser {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    state: Mutex<UserState>,
}

impl TrackedUser {
    fn new(user_name: &str, email: &str) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            user_name: user_name.to_owned(),
            email: email.to_owned(),
            state: Mutex::new(UserState::default()),
        }
    }

    /// Appends to the user's location history. Insertion order is
    /// chronological order; entries are never removed.
    pub async fn add_visited_location(&self, visit: VisitedLocation) {
        self.state.lock().await.visited.push(visit);
    }

    pub async fn last_visited_location(&self) -> Option<VisitedLocation> {
        self.state.lock().await.visited.last().copied()
    }

    pub async fn visited_locations(&self) -> Vec<VisitedLocation> {
        self.state.lock().await.visited.clone()
    }

    pub async fn visit_count(&self) -> usize {
        self.state.lock().await.visited.len()
    }

    pub async fn rewards(&self) -> Vec<UserReward> {
        self.state.lock().await.rewards.values().cloned().collect()
    }

    pub async fn reward_count(&self) -> usize {
        self.state.lock().await.rewards.len()
    }

    /// The attraction ids this user already holds a reward for.
    pub async fn rewarded_attractions(&self) -> HashSet<Uuid> {
        self.state.lock().await.rewards.keys().copied().collect()
    }

    pub async fn has_reward(&self, attraction_id: Uuid) -> bool {
        self.state.lock().await.rewards.contains_key(&attraction_id)
    }

    /// Records `reward` unless one already exists for the same attraction.
    ///
    /// Returns `true` when the reward was inserted. The check and the insert
    /// happen under the user's state lock in one step, so two concurrent
    /// grant attempts for the same attraction can never both succeed.
    pub async fn add_reward_if_absent(&self, reward: UserReward) -> bool {
        let mut state = self.state.lock().await;
        match state.rewards.entry(reward.attraction_id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(reward);
                true
            }
        }
    }

    pub async fn cumulative_reward_points(&self) -> i32 {
        self.state
            .lock()
            .await
            .rewards
            .values()
            .fold(0i32, |sum, r| sum.saturating_add(r.points))
    }

    pub async fn travel_preferences(&self) -> TravelPreferences {
        self.state.lock().await.preferences
    }

    pub async fn set_travel_preferences(&self, preferences: TravelPreferences) {
        self.state.lock().await.preferences = preferences;
    }

    pub async fn set_trip_deals(&self, offers: Vec<TripOffer>) {
        self.state.lock().await.trip_deals = offers;
    }

    pub async fn trip_deals(&self) -> Vec<TripOffer> {
        self.state.lock().await.trip_deals.clone()
    }
}

/// Name-keyed registry of tracked users.
pub struct UserStore {
    users: RwLock<HashMap<String, Arc<TrackedUser>>>,
}

impl UserStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a user, or returns the existing handle when the name is
    /// already taken. Identity is the user name.
    pub async fn add_user(&self, user_name: &str, email: &str) -> Arc<TrackedUser> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.get(user_name) {
            return Arc::clone(existing);
        }
        let user = Arc::new(TrackedUser::new(user_name, email));
        users.insert(user_name.to_owned(), Arc::clone(&user));
        user
    }

    pub async fn user(&self, user_name: &str) -> Option<Arc<TrackedUser>> {
        self.users.read().await.get(user_name).map(Arc::clone)
    }

    /// Snapshot of every registered user, in no particular order.
    pub async fn all_users(&self) -> Vec<Arc<TrackedUser>> {
        self.users.read().await.values().map(Arc::clone).collect()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use wayward_core::GeoPoint;

    use super::*;

    fn visit(user_id: Uuid, latitude: f64) -> VisitedLocation {
        VisitedLocation {
            user_id,
            location: GeoPoint::new(latitude, 0.0),
            visited_at: Utc::now(),
        }
    }

    fn reward(user_id: Uuid, attraction_id: Uuid, points: i32) -> UserReward {
        UserReward {
            user_id,
            attraction_id,
            attraction_name: "test attraction".to_owned(),
            points,
        }
    }

    #[tokio::test]
    async fn add_user_is_idempotent_by_name() {
        let store = UserStore::new();
        let first = store.add_user("jon", "jon@wayward.com").await;
        let second = store.add_user("jon", "other@wayward.com").await;

        assert_eq!(first.user_id, second.user_id);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn lookup_by_name() {
        let store = UserStore::new();
        store.add_user("jon", "jon@wayward.com").await;

        assert!(store.user("jon").await.is_some());
        assert!(store.user("nobody").await.is_none());
    }

    #[tokio::test]
    async fn history_preserves_insertion_order() {
        let store = UserStore::new();
        let user = store.add_user("jon", "jon@wayward.com").await;

        for latitude in [1.0, 2.0, 3.0] {
            user.add_visited_location(visit(user.user_id, latitude)).await;
        }

        let history = user.visited_locations().await;
        assert_eq!(history.len(), 3);
        assert!((history[0].location.latitude - 1.0).abs() < f64::EPSILON);
        assert!((history[2].location.latitude - 3.0).abs() < f64::EPSILON);

        let last = user.last_visited_location().await.unwrap();
        assert!((last.location.latitude - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn last_visited_location_is_none_for_fresh_user() {
        let store = UserStore::new();
        let user = store.add_user("jon", "jon@wayward.com").await;
        assert!(user.last_visited_location().await.is_none());
    }

    #[tokio::test]
    async fn duplicate_rewards_are_rejected() {
        let store = UserStore::new();
        let user = store.add_user("jon", "jon@wayward.com").await;
        let attraction_id = Uuid::new_v4();

        assert!(
            user.add_reward_if_absent(reward(user.user_id, attraction_id, 100))
                .await
        );
        assert!(
            !user
                .add_reward_if_absent(reward(user.user_id, attraction_id, 999))
                .await
        );

        assert_eq!(user.reward_count().await, 1);
        assert!(user.has_reward(attraction_id).await);
        // The first grant wins; the losing write must not overwrite it.
        assert_eq!(user.rewards().await[0].points, 100);
    }

    #[tokio::test]
    async fn concurrent_grants_for_one_attraction_insert_exactly_once() {
        let store = UserStore::new();
        let user = store.add_user("jon", "jon@wayward.com").await;
        let attraction_id = Uuid::new_v4();

        let mut handles = Vec::new();
        for i in 0..16 {
            let user = Arc::clone(&user);
            handles.push(tokio::spawn(async move {
                user.add_reward_if_absent(reward(user.user_id, attraction_id, i))
                    .await
            }));
        }

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1, "exactly one concurrent grant may win");
        assert_eq!(user.reward_count().await, 1);
    }

    #[tokio::test]
    async fn cumulative_points_sum_over_all_rewards() {
        let store = UserStore::new();
        let user = store.add_user("jon", "jon@wayward.com").await;

        user.add_reward_if_absent(reward(user.user_id, Uuid::new_v4(), 100))
            .await;
        user.add_reward_if_absent(reward(user.user_id, Uuid::new_v4(), 250))
            .await;

        assert_eq!(user.cumulative_reward_points().await, 350);
    }

    #[tokio::test]
    async fn trip_deals_round_trip() {
        let store = UserStore::new();
        let user = store.add_user("jon", "jon@wayward.com").await;
        assert!(user.trip_deals().await.is_empty());

        let offers = vec![TripOffer {
            provider: "Holiday Travels".to_owned(),
            trip_id: Uuid::new_v4(),
            price: rust_decimal::Decimal::new(49_999, 2),
        }];
        user.set_trip_deals(offers.clone()).await;

        let stored = user.trip_deals().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].provider, offers[0].provider);
    }

    #[tokio::test]
    async fn preferences_default_and_update() {
        let store = UserStore::new();
        let user = store.add_user("jon", "jon@wayward.com").await;

        let defaults = user.travel_preferences().await;
        assert_eq!(defaults.adults, 1);
        assert_eq!(defaults.children, 0);
        assert_eq!(defaults.trip_duration_days, 1);

        user.set_travel_preferences(TravelPreferences {
            adults: 2,
            children: 3,
            trip_duration_days: 7,
        })
        .await;
        assert_eq!(user.travel_preferences().await.children, 3);
    }
}
