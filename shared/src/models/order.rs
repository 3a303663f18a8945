//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geo::Coordinates;

/// Order lifecycle
///
/// ```text
/// ready-to-checkout → order-placed → confirmed → preparing → picked-up → on-the-way → completed
///          └──────────────┴─────────────┴───────────┴───────────┴────────────┴──→ rejected | cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    ReadyToCheckout,
    OrderPlaced,
    Confirmed,
    Preparing,
    PickedUp,
    OnTheWay,
    Completed,
    Rejected,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: &'static [OrderStatus] = &[
        Self::ReadyToCheckout,
        Self::OrderPlaced,
        Self::Confirmed,
        Self::Preparing,
        Self::PickedUp,
        Self::OnTheWay,
        Self::Completed,
        Self::Rejected,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadyToCheckout => "ready-to-checkout",
            Self::OrderPlaced => "order-placed",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::PickedUp => "picked-up",
            Self::OnTheWay => "on-the-way",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }

    /// The next state along the happy path, if any
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            Self::ReadyToCheckout => Some(Self::OrderPlaced),
            Self::OrderPlaced => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Preparing),
            Self::Preparing => Some(Self::PickedUp),
            Self::PickedUp => Some(Self::OnTheWay),
            Self::OnTheWay => Some(Self::Completed),
            Self::Completed | Self::Rejected | Self::Cancelled => None,
        }
    }

    /// Whether `to` is adjacent to `self` in the lifecycle graph
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(to, Self::Rejected | Self::Cancelled) || self.next() == Some(to)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// Settlement state, used by both orders and payment records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// A line of an order. Immutable once the order exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub menu_item_id: Option<String>,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub restaurant_id: String,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    /// Copied from the customer profile when the order was created
    pub delivery_address: String,
    pub delivery_location: Option<Coordinates>,
    pub created_at: i64,
}

/// Create order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderCreate {
    pub restaurant_id: Option<String>,
    pub items: Option<Vec<OrderItem>>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,
}

/// Update order status payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderStatusUpdate {
    /// Kept as a raw string so an unknown value becomes a validation error
    pub order_status: Option<String>,
}
