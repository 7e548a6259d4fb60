//! Internal user seeding for non-production environments.

use chrono::{Duration, Utc};
use rand::Rng;

use wayward_core::VisitedLocation;
use wayward_gps::GpsSimulator;

use crate::store::UserStore;

/// Historical visits fabricated per seeded user.
pub const SEED_VISITS_PER_USER: usize = 3;

const THIRTY_DAYS_SECS: i64 = 30 * 24 * 60 * 60;

/// Registers `count` internal users, each with a short random visit history
/// spread over the past thirty days. Names follow the `internalUser{n}`
/// pattern, so reseeding an already-populated store reuses the existing
/// users and only appends more history.
pub async fn seed_internal_users(store: &UserStore, count: usize) {
    let mut rng = rand::rng();
    for i in 0..count {
        let name = format!("internalUser{i}");
        let email = format!("internalUser{i}@wayward.com");
        let user = store.add_user(&name, &email).await;

        let mut offsets_secs: Vec<i64> = (0..SEED_VISITS_PER_USER)
            .map(|_| rng.random_range(0..=THIRTY_DAYS_SECS))
            .collect();
        // Oldest first, so the history reads in chronological order.
        offsets_secs.sort_unstable_by(|a, b| b.cmp(a));

        for offset in offsets_secs {
            user.add_visited_location(VisitedLocation {
                user_id: user.user_id,
                location: GpsSimulator::random_location(),
                visited_at: Utc::now() - Duration::seconds(offset),
            })
            .await;
        }
    }

    tracing::info!(
        users = count,
        visits_per_user = SEED_VISITS_PER_USER,
        "seeded internal users"
    );
}
