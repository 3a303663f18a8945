use async_trait::async_trait;
use parking_lot::RwLock;
use shared::error::ServiceResult;
use shared::models::{Payment, PaymentStatus};

use super::{PaymentStore, Settlement};

/// In-process store, insertion ordered
#[derive(Default)]
pub struct MemoryPaymentStore {
    rows: RwLock<Vec<Payment>>,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn insert(&self, payment: &Payment) -> ServiceResult<()> {
        self.rows.write().push(payment.clone());
        Ok(())
    }

    async fn latest_for_order(&self, order_id: &str) -> ServiceResult<Option<Payment>> {
        Ok(self
            .rows
            .read()
            .iter()
            .rev()
            .find(|p| p.order_id == order_id)
            .cloned())
    }

    async fn settle(
        &self,
        transaction_id: &str,
        status: PaymentStatus,
    ) -> ServiceResult<Settlement> {
        let mut rows = self.rows.write();
        let Some(payment) = rows.iter_mut().find(|p| p.transaction_id == transaction_id) else {
            return Ok(Settlement::Unknown);
        };
        if payment.status != PaymentStatus::Pending {
            return Ok(Settlement::Unchanged(payment.clone()));
        }
        payment.status = status;
        Ok(Settlement::Updated(payment.clone()))
    }
}
