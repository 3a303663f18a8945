use async_trait::async_trait;
use parking_lot::RwLock;
use shared::error::ServiceResult;
use shared::models::{Order, OrderStatus};

use super::OrderStore;

/// In-process store, insertion ordered
#[derive(Default)]
pub struct MemoryOrderStore {
    rows: RwLock<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> ServiceResult<()> {
        self.rows.write().push(order.clone());
        Ok(())
    }

    async fn find(&self, id: &str) -> ServiceResult<Option<Order>> {
        Ok(self.rows.read().iter().find(|o| o.id == id).cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> ServiceResult<Vec<Order>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_restaurant(
        &self,
        restaurant_id: &str,
        status: Option<OrderStatus>,
    ) -> ServiceResult<Vec<Order>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|o| o.restaurant_id == restaurant_id)
            .filter(|o| status.is_none_or(|s| o.order_status == s))
            .cloned()
            .collect())
    }

    async fn set_status(&self, id: &str, status: OrderStatus) -> ServiceResult<Option<Order>> {
        let mut rows = self.rows.write();
        Ok(rows.iter_mut().find(|o| o.id == id).map(|o| {
            o.order_status = status;
            o.clone()
        }))
    }
}
