//! API routes for the restaurant service

pub mod health;
pub mod restaurants;

use axum::routing::{get, post, put};
use axum::{Router, middleware};
use shared::auth::{require_auth, require_role};
use shared::models::Role;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let operator = Router::new()
        .route("/add-restaurant", post(restaurants::add_restaurant))
        .route("/my-restaurants", get(restaurants::my_restaurants))
        .route("/update-restaurant/{id}", put(restaurants::update_restaurant))
        .layer(middleware::from_fn(require_role(&[Role::RestaurantAdmin])));

    let admin = Router::new()
        .route("/approve/{restaurant_id}", put(restaurants::approve))
        .route("/reject/{restaurant_id}", put(restaurants::reject))
        .layer(middleware::from_fn(require_role(&[Role::Admin])));

    let authenticated = Router::new()
        .route("/check-owner", get(restaurants::check_owner))
        .route("/nearby-restaurants", get(restaurants::nearby_restaurants))
        .merge(operator)
        .merge(admin)
        .layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            require_auth,
        ));

    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/all-restaurants", get(restaurants::all_restaurants))
        .route("/restaurants/{id}", get(restaurants::get_restaurant));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
