//! API routes for the payment service

pub mod health;
pub mod payments;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router. None of the payment routes carry a bearer
/// token; the webhook is authenticated by its signature.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/pay", post(payments::create_payment))
        .route("/payment-status/{order_id}", get(payments::payment_status))
        .route("/webhook", post(payments::handle_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
