//! Payment Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::PaymentStatus;

/// Local record of a provider payment intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub user_id: String,
    /// Major currency units
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payment_method: String,
    pub status: PaymentStatus,
    /// Provider intent id, the correlation key for webhook events
    pub transaction_id: String,
    pub created_at: i64,
}

/// Create payment payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentCreate {
    pub order_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
}

/// Response of a successful payment initiation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub message: String,
    pub client_secret: String,
    pub payment: Payment,
}
