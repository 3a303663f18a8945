//! Payment storage
//!
//! Settlement is conditional on the stored status being `pending`, so webhook
//! replays and out-of-order events cannot move a settled payment.

mod memory;
mod pg;

pub use memory::MemoryPaymentStore;
pub use pg::PgPaymentStore;

use async_trait::async_trait;
use shared::error::ServiceResult;
use shared::models::{Payment, PaymentStatus};

/// Outcome of a settlement attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// The payment was pending and now carries the new status
    Updated(Payment),
    /// The payment was already settled and was left as is
    Unchanged(Payment),
    /// No payment has this transaction id
    Unknown,
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, payment: &Payment) -> ServiceResult<()>;

    /// Most recently created payment for an order
    async fn latest_for_order(&self, order_id: &str) -> ServiceResult<Option<Payment>>;

    /// Move a pending payment to `status`
    async fn settle(&self, transaction_id: &str, status: PaymentStatus)
    -> ServiceResult<Settlement>;
}
