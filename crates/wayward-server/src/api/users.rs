//! User-scoped handlers: registration, location, nearby attractions,
//! rewards, trip deals.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wayward_core::TripOffer;

use crate::middleware::RequestId;

use super::{map_service_error, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(in crate::api) struct RegisterUserRequest {
    pub user_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct RegisterUserResponse {
    pub user_id: Uuid,
    pub user_name: String,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct LocationData {
    pub user_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub visited_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct NearbyData {
    pub user_latitude: f64,
    pub user_longitude: f64,
    pub attractions: Vec<NearbyAttractionItem>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct NearbyAttractionItem {
    pub name: String,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_miles: f64,
    pub reward_points: i32,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct RewardsData {
    pub rewards: Vec<RewardItem>,
    pub total_points: i64,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct RewardItem {
    pub attraction_id: Uuid,
    pub attraction_name: String,
    pub points: i32,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_registration(req_id: &str, body: &RegisterUserRequest) -> Result<(), ApiError> {
    let name = body.user_name.trim();
    if name.is_empty() || name.len() > 100 {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "user_name must be 1 to 100 characters",
        ));
    }
    if !body.email.contains('@') {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "email must contain an '@'",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users: register a user for tracking.
///
/// Registration is idempotent by name: re-registering an existing name
/// returns the existing user's id.
pub(in crate::api) async fn register_user(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterUserResponse>>), ApiError> {
    validate_registration(&req_id.0, &body)?;

    let user_name = body.user_name.trim().to_owned();
    let email = body.email.trim().to_owned();
    let user = state.service.add_user(&user_name, &email).await;
    tracing::info!(user = %user.user_name, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: RegisterUserResponse {
                user_id: user.user_id,
                user_name: user.user_name.clone(),
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/users/{user_name}/location: most recent known position.
pub(in crate::api) async fn get_user_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_name): Path<String>,
) -> Result<Json<ApiResponse<LocationData>>, ApiError> {
    let visit = state
        .service
        .user_location(&user_name)
        .await
        .map_err(|e| map_service_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: LocationData {
            user_name,
            latitude: visit.location.latitude,
            longitude: visit.location.longitude,
            visited_at: visit.visited_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/users/{user_name}/nearby: the five closest attractions with
/// distances and the reward points each pair would earn.
pub(in crate::api) async fn get_nearby_attractions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_name): Path<String>,
) -> Result<Json<ApiResponse<NearbyData>>, ApiError> {
    let nearby = state
        .service
        .nearby_attractions(&user_name)
        .await
        .map_err(|e| map_service_error(req_id.0.clone(), &e))?;

    let attractions = nearby
        .attractions
        .into_iter()
        .map(|entry| NearbyAttractionItem {
            name: entry.attraction.name,
            city: entry.attraction.city,
            state: entry.attraction.state,
            latitude: entry.attraction.location.latitude,
            longitude: entry.attraction.location.longitude,
            distance_miles: entry.distance_miles,
            reward_points: entry.reward_points,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: NearbyData {
            user_latitude: nearby.user_location.latitude,
            user_longitude: nearby.user_location.longitude,
            attractions,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/users/{user_name}/rewards: every reward granted so far.
pub(in crate::api) async fn get_user_rewards(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_name): Path<String>,
) -> Result<Json<ApiResponse<RewardsData>>, ApiError> {
    let rewards = state
        .service
        .user_rewards(&user_name)
        .await
        .map_err(|e| map_service_error(req_id.0.clone(), &e))?;

    let total_points = rewards.iter().map(|r| i64::from(r.points)).sum();
    let rewards = rewards
        .into_iter()
        .map(|r| RewardItem {
            attraction_id: r.attraction_id,
            attraction_name: r.attraction_name,
            points: r.points,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: RewardsData {
            rewards,
            total_points,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/users/{user_name}/trip-deals: quote trip offers priced off
/// the user's cumulative reward points.
pub(in crate::api) async fn get_trip_deals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_name): Path<String>,
) -> Result<Json<ApiResponse<Vec<TripOffer>>>, ApiError> {
    let offers = state
        .service
        .trip_deals(&user_name)
        .await
        .map_err(|e| map_service_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: offers,
        meta: ResponseMeta::new(req_id.0),
    }))
}
