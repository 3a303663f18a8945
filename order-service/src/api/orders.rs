//! Order API handlers
//!
//! POST /create-order                        customer
//! GET  /my-orders                           customer
//! GET  /orders-by-restaurant/{id}?status=   restaurant_admin, owner
//! PUT  /update-status/{id}                  restaurant_admin, owner

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use shared::auth::CurrentUser;
use shared::error::ServiceResult;
use shared::models::{Order, OrderCreate, OrderStatusUpdate};

use crate::ledger::parse_status;
use crate::state::AppState;

// ── POST /create-order ──

pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<OrderCreate>,
) -> ServiceResult<(StatusCode, Json<Value>)> {
    let order = state.ledger.create(&user, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order placed successfully",
            "order": order,
        })),
    ))
}

// ── GET /my-orders ──

pub async fn my_orders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ServiceResult<Json<Vec<Order>>> {
    Ok(Json(state.ledger.list_by_customer(&user).await?))
}

// ── GET /orders-by-restaurant/{id}?status= ──

#[derive(Debug, Default, Deserialize)]
pub struct RestaurantOrdersQuery {
    pub status: Option<String>,
}

pub async fn orders_by_restaurant(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(restaurant_id): Path<String>,
    Query(query): Query<RestaurantOrdersQuery>,
) -> ServiceResult<Json<Vec<Order>>> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(parse_status(Some(raw))?),
        None => None,
    };
    let orders = state
        .ledger
        .list_by_restaurant(&user, &restaurant_id, status)
        .await?;
    Ok(Json(orders))
}

// ── PUT /update-status/{id} ──

pub async fn update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
    Json(body): Json<OrderStatusUpdate>,
) -> ServiceResult<Json<Order>> {
    let status = parse_status(body.order_status.as_deref())?;
    let order = state.ledger.transition(&user, &order_id, status).await?;
    Ok(Json(order))
}
