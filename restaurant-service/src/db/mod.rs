//! Restaurant storage
//!
//! [`RestaurantStore`] is implemented by [`PgRestaurantStore`] (PostgreSQL)
//! and [`MemoryRestaurantStore`] (used when no database is configured, and in
//! tests). Every mutation is a single atomic step; list results come back in
//! creation order.

mod memory;
mod pg;

pub use memory::MemoryRestaurantStore;
pub use pg::PgRestaurantStore;

use async_trait::async_trait;
use shared::error::ServiceResult;
use shared::models::{Restaurant, RestaurantStatus, RestaurantUpdate};

#[async_trait]
pub trait RestaurantStore: Send + Sync {
    /// Insert a new restaurant. Email or phone already in use is a conflict.
    async fn insert(&self, restaurant: &Restaurant) -> ServiceResult<()>;

    async fn find(&self, id: &str) -> ServiceResult<Option<Restaurant>>;

    /// Any restaurant using `email` or `phone`
    async fn find_by_contact(&self, email: &str, phone: &str)
    -> ServiceResult<Option<Restaurant>>;

    /// Whether `phone` belongs to a restaurant other than `except_id`
    async fn phone_in_use(&self, phone: &str, except_id: &str) -> ServiceResult<bool>;

    async fn list_by_owner(&self, owner_id: &str) -> ServiceResult<Vec<Restaurant>>;

    async fn owner_exists(&self, owner_id: &str) -> ServiceResult<bool>;

    async fn list_all(&self) -> ServiceResult<Vec<Restaurant>>;

    /// Approved, open and geocoded restaurants
    async fn list_discoverable(&self) -> ServiceResult<Vec<Restaurant>>;

    /// Set the review outcome. `approved` follows `status`.
    async fn set_review(
        &self,
        id: &str,
        status: RestaurantStatus,
    ) -> ServiceResult<Option<Restaurant>>;

    /// Apply an owner patch; `None` fields are left as they are.
    async fn apply_update(
        &self,
        id: &str,
        patch: &RestaurantUpdate,
    ) -> ServiceResult<Option<Restaurant>>;
}
