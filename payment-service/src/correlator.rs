//! Payment correlation
//!
//! A payment is created locally only after the provider has accepted the
//! intent. The provider's intent id becomes the transaction id that later
//! webhook events are matched against.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use shared::error::{AppError, ErrorCode, ServiceResult};
use shared::models::{Payment, PaymentCreate, PaymentStatus};
use shared::util::{new_id, now_millis};
use shared::validation::{MAX_SHORT_TEXT_LEN, require_text};

use crate::db::{PaymentStore, Settlement};
use crate::stripe::{IntentRequest, PaymentProvider, WebhookEvent};

pub const PAYMENT_METHOD: &str = "Stripe";

pub const EVENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const EVENT_FAILED: &str = "payment_intent.payment_failed";

/// Major units to the provider's minor units, half away from zero
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Result of applying a webhook event
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    Settled(Payment),
    /// Replay or late event for a payment that is no longer pending
    AlreadySettled(Payment),
    UnknownTransaction(String),
    /// Event type the service does not act on
    Ignored,
}

#[derive(Clone)]
pub struct PaymentCorrelator {
    store: Arc<dyn PaymentStore>,
    provider: Arc<dyn PaymentProvider>,
    currency: String,
}

impl PaymentCorrelator {
    pub fn new(
        store: Arc<dyn PaymentStore>,
        provider: Arc<dyn PaymentProvider>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            currency: currency.into(),
        }
    }

    /// Create a provider intent and record the pending payment.
    /// Returns the client secret alongside the stored payment.
    pub async fn initiate(&self, body: PaymentCreate) -> ServiceResult<(String, Payment)> {
        let order_id = require_text(body.order_id, "orderId", MAX_SHORT_TEXT_LEN)?;
        let user_id = require_text(body.user_id, "userId", MAX_SHORT_TEXT_LEN)?;
        let amount = body.amount.ok_or_else(|| AppError::required("amount"))?;
        if amount <= Decimal::ZERO {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "amount must be greater than zero",
            )
            .with_detail("field", "amount")
            .into());
        }
        let amount_minor = to_minor_units(amount)
            .filter(|minor| *minor > 0)
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::ValueOutOfRange, "amount is out of range")
                    .with_detail("field", "amount")
            })?;

        let intent = self
            .provider
            .create_intent(&IntentRequest {
                amount_minor,
                currency: &self.currency,
                order_id: &order_id,
                user_id: &user_id,
            })
            .await?;

        let payment = Payment {
            id: new_id(),
            order_id,
            user_id,
            amount,
            payment_method: PAYMENT_METHOD.to_string(),
            status: PaymentStatus::Pending,
            transaction_id: intent.id,
            created_at: now_millis(),
        };
        self.store.insert(&payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            order_id = %payment.order_id,
            transaction_id = %payment.transaction_id,
            amount_minor,
            "Payment intent created"
        );
        Ok((intent.client_secret, payment))
    }

    /// Latest payment recorded for an order
    pub async fn status(&self, order_id: &str) -> ServiceResult<Payment> {
        self.store
            .latest_for_order(order_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::PaymentNotFound)
                    .with_detail("orderId", order_id)
                    .into()
            })
    }

    /// Apply a provider event to the matching payment
    pub async fn reconcile(&self, event: &WebhookEvent) -> ServiceResult<Reconciliation> {
        let target = match event.event_type.as_str() {
            EVENT_SUCCEEDED => PaymentStatus::Completed,
            EVENT_FAILED => PaymentStatus::Failed,
            other => {
                tracing::debug!(event_type = other, "Unhandled webhook event type");
                return Ok(Reconciliation::Ignored);
            }
        };

        let Some(transaction_id) = event.intent_id() else {
            tracing::warn!(event_type = %event.event_type, "Webhook event without intent id");
            return Ok(Reconciliation::Ignored);
        };

        let outcome = match self.store.settle(transaction_id, target).await? {
            Settlement::Updated(payment) => {
                tracing::info!(
                    transaction_id,
                    order_id = %payment.order_id,
                    status = %payment.status,
                    "Payment settled"
                );
                Reconciliation::Settled(payment)
            }
            Settlement::Unchanged(payment) => {
                tracing::info!(
                    transaction_id,
                    status = %payment.status,
                    "Payment already settled, event ignored"
                );
                Reconciliation::AlreadySettled(payment)
            }
            Settlement::Unknown => {
                tracing::warn!(transaction_id, "No payment found for transaction");
                Reconciliation::UnknownTransaction(transaction_id.to_string())
            }
        };
        Ok(outcome)
    }
}
