//! API routes for the order service

pub mod health;
pub mod orders;

use axum::routing::{get, post, put};
use axum::{Router, middleware};
use shared::auth::{require_auth, require_role};
use shared::models::Role;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let customer = Router::new()
        .route("/create-order", post(orders::create_order))
        .route("/my-orders", get(orders::my_orders))
        .layer(middleware::from_fn(require_role(&[Role::Customer])));

    let operator = Router::new()
        .route("/orders-by-restaurant/{id}", get(orders::orders_by_restaurant))
        .route("/update-status/{id}", put(orders::update_status))
        .layer(middleware::from_fn(require_role(&[Role::RestaurantAdmin])));

    let authenticated = Router::new()
        .merge(customer)
        .merge(operator)
        .layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(authenticated)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
