//! Restaurant API handlers
//!
//! POST /add-restaurant               submit for review (restaurant_admin)
//! GET  /my-restaurants               caller's restaurants (restaurant_admin)
//! GET  /check-owner                  does the caller own any restaurant
//! PUT  /update-restaurant/{id}       owner update (restaurant_admin, owner)
//! PUT  /approve/{restaurantId}       admin
//! PUT  /reject/{restaurantId}        admin
//! GET  /all-restaurants              public
//! GET  /restaurants/{id}             public
//! GET  /nearby-restaurants           authenticated

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use shared::auth::CurrentUser;
use shared::error::{AppError, ErrorCode, ServiceResult};
use shared::models::{NearbyResponse, Restaurant, RestaurantCreate, RestaurantUpdate};

use crate::directory::parse_max_distance;
use crate::state::AppState;

// ── POST /add-restaurant ──

pub async fn add_restaurant(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(draft): Json<RestaurantCreate>,
) -> ServiceResult<(StatusCode, Json<Value>)> {
    let restaurant = state.directory.submit(&user, draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Restaurant submitted for admin approval",
            "restaurant": restaurant,
        })),
    ))
}

// ── GET /my-restaurants ──

pub async fn my_restaurants(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ServiceResult<Json<Value>> {
    let restaurants = state.directory.mine(&user).await?;
    Ok(Json(json!({
        "message": "Your restaurants retrieved successfully",
        "restaurants": restaurants,
    })))
}

// ── GET /check-owner ──

pub async fn check_owner(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ServiceResult<Json<Value>> {
    let exists = state.directory.owner_exists(&user).await?;
    Ok(Json(json!({ "exists": exists })))
}

// ── PUT /update-restaurant/{id} ──

pub async fn update_restaurant(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<RestaurantUpdate>,
) -> ServiceResult<Json<Value>> {
    let restaurant = state.directory.update(&user, &id, patch).await?;
    Ok(Json(json!({
        "message": "Restaurant details updated successfully",
        "restaurant": restaurant,
    })))
}

// ── PUT /approve/{restaurantId}, PUT /reject/{restaurantId} ──

pub async fn approve(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> ServiceResult<Json<Value>> {
    let restaurant = state.directory.approve(&restaurant_id).await?;
    Ok(Json(json!({
        "message": "Restaurant approved successfully",
        "restaurant": restaurant,
    })))
}

pub async fn reject(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> ServiceResult<Json<Value>> {
    let restaurant = state.directory.reject(&restaurant_id).await?;
    Ok(Json(json!({
        "message": "Restaurant rejected successfully",
        "restaurant": restaurant,
    })))
}

// ── GET /all-restaurants, GET /restaurants/{id} ──

pub async fn all_restaurants(State(state): State<AppState>) -> ServiceResult<Json<Value>> {
    let restaurants = state.directory.all().await?;
    Ok(Json(json!({ "restaurants": restaurants })))
}

pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<Json<Restaurant>> {
    Ok(Json(state.directory.get(&id).await?))
}

// ── GET /nearby-restaurants?maxDistance= ──

#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    #[serde(rename = "maxDistance")]
    pub max_distance: Option<String>,
}

pub async fn nearby_restaurants(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<NearbyQuery>,
) -> ServiceResult<Json<NearbyResponse>> {
    let max_km = parse_max_distance(query.max_distance.as_deref())?;

    let center = state
        .locations
        .resolve_location(&user)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::LocationUnavailable).with_detail(
                "solution",
                "Update your profile with your address in the user service",
            )
        })?;

    let restaurants = state.directory.nearby(center, max_km).await?;
    tracing::debug!(
        user_id = %user.id,
        radius_km = max_km,
        found = restaurants.len(),
        "Nearby search"
    );

    Ok(Json(NearbyResponse {
        user_location: center,
        search_radius: max_km,
        count: restaurants.len(),
        restaurants,
    }))
}
