//! Pure great-circle math over [`GeoPoint`]s. No state, safe from any caller.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::{Attraction, GeoPoint};

/// Mean earth radius in statute miles for the spherical approximation.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Great-circle distance between two coordinates in statute miles (haversine).
///
/// Symmetric in its arguments and exactly `0.0` when `a == b`.
#[must_use]
pub fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    // sqrt(h) can land a few ulps above 1.0 for near-antipodal points.
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

/// Whether `a` and `b` are within `threshold_miles` of each other (inclusive).
#[must_use]
pub fn is_within_range(a: GeoPoint, b: GeoPoint, threshold_miles: f64) -> bool {
    distance_miles(a, b) <= threshold_miles
}

/// The `k` attractions nearest to `origin`, ascending by distance.
///
/// Selection runs over a size-capped max-heap rather than sorting the whole
/// catalog. Distance ties break on catalog order.
#[must_use]
pub fn nearest_attractions(
    origin: GeoPoint,
    catalog: &[Attraction],
    k: usize,
) -> Vec<(Attraction, f64)> {
    if k == 0 || catalog.is_empty() {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
    for (index, attraction) in catalog.iter().enumerate() {
        heap.push(Candidate {
            distance: distance_miles(origin, attraction.location),
            index,
        });
        if heap.len() > k {
            heap.pop();
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|c| (catalog[c.index].clone(), c.distance))
        .collect()
}

struct Candidate {
    distance: f64,
    index: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}
