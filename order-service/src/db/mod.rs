//! Order storage
//!
//! [`OrderStore`] has a PostgreSQL and an in-memory implementation. The status
//! update is a single atomic statement; concurrent updates are last-writer-wins.

mod memory;
mod pg;

pub use memory::MemoryOrderStore;
pub use pg::PgOrderStore;

use async_trait::async_trait;
use shared::error::ServiceResult;
use shared::models::{Order, OrderStatus};

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> ServiceResult<()>;

    async fn find(&self, id: &str) -> ServiceResult<Option<Order>>;

    /// Orders of a customer, oldest first
    async fn list_by_user(&self, user_id: &str) -> ServiceResult<Vec<Order>>;

    /// Orders of a restaurant, oldest first, optionally in one status
    async fn list_by_restaurant(
        &self,
        restaurant_id: &str,
        status: Option<OrderStatus>,
    ) -> ServiceResult<Vec<Order>>;

    /// Overwrite the order status and return the updated order
    async fn set_status(&self, id: &str, status: OrderStatus) -> ServiceResult<Option<Order>>;
}
