//! Payment API handlers
//!
//! POST /pay                       create a payment intent
//! GET  /payment-status/{orderId}   latest payment of an order
//! POST /webhook                   Stripe events (raw body for signature verification)

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode, ServiceResult};
use shared::models::{Payment, PaymentCreate, PaymentIntentResponse};

use crate::state::AppState;
use crate::stripe::{self, WebhookEvent};

const SIGNATURE_HEADER: &str = "stripe-signature";

// ── POST /pay ──

pub async fn create_payment(
    State(state): State<AppState>,
    Json(body): Json<PaymentCreate>,
) -> ServiceResult<(StatusCode, Json<PaymentIntentResponse>)> {
    let (client_secret, payment) = state.correlator.initiate(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(PaymentIntentResponse {
            message: "Payment intent created successfully".to_string(),
            client_secret,
            payment,
        }),
    ))
}

// ── GET /payment-status/{orderId} ──

pub async fn payment_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> ServiceResult<Json<Payment>> {
    Ok(Json(state.correlator.status(&order_id).await?))
}

// ── POST /webhook ──

/// Acknowledges every well-formed event with `{received: true}`, including
/// events for unknown transactions. Storage failures return 500 so the
/// provider retries.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ServiceResult<Json<Value>> {
    if let Some(secret) = state.webhook_secret.as_deref() {
        let Some(sig_header) = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
        else {
            shared::security_log!("WARN", "webhook_signature_missing", header = SIGNATURE_HEADER);
            return Err(AppError::with_message(
                ErrorCode::InvalidRequest,
                "Missing Stripe-Signature header",
            )
            .into());
        };

        if let Err(reason) = stripe::verify_webhook_signature(&body, sig_header, secret) {
            shared::security_log!("WARN", "webhook_signature_invalid", reason = reason);
            return Err(AppError::with_message(ErrorCode::InvalidRequest, reason).into());
        }
    }

    let event: WebhookEvent = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse webhook JSON");
        AppError::with_message(ErrorCode::InvalidFormat, format!("Webhook Error: {e}"))
    })?;

    tracing::info!(
        event_type = %event.event_type,
        event_id = event.id.as_deref().unwrap_or(""),
        "Received Stripe webhook"
    );

    state.correlator.reconcile(&event).await?;
    Ok(Json(json!({ "received": true })))
}
