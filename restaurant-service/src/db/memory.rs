use async_trait::async_trait;
use parking_lot::RwLock;
use shared::error::{AppError, ErrorCode, ServiceResult};
use shared::models::{Restaurant, RestaurantStatus, RestaurantUpdate};

use super::RestaurantStore;

/// In-process store, insertion ordered
#[derive(Default)]
pub struct MemoryRestaurantStore {
    rows: RwLock<Vec<Restaurant>>,
}

impl MemoryRestaurantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RestaurantStore for MemoryRestaurantStore {
    async fn insert(&self, restaurant: &Restaurant) -> ServiceResult<()> {
        let mut rows = self.rows.write();
        if rows
            .iter()
            .any(|r| r.email == restaurant.email || r.phone == restaurant.phone)
        {
            return Err(AppError::with_message(
                ErrorCode::RestaurantAlreadyExists,
                "Restaurant with this email or phone already exists",
            )
            .into());
        }
        rows.push(restaurant.clone());
        Ok(())
    }

    async fn find(&self, id: &str) -> ServiceResult<Option<Restaurant>> {
        Ok(self.rows.read().iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_contact(
        &self,
        email: &str,
        phone: &str,
    ) -> ServiceResult<Option<Restaurant>> {
        Ok(self
            .rows
            .read()
            .iter()
            .find(|r| r.email == email || r.phone == phone)
            .cloned())
    }

    async fn phone_in_use(&self, phone: &str, except_id: &str) -> ServiceResult<bool> {
        Ok(self
            .rows
            .read()
            .iter()
            .any(|r| r.phone == phone && r.id != except_id))
    }

    async fn list_by_owner(&self, owner_id: &str) -> ServiceResult<Vec<Restaurant>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn owner_exists(&self, owner_id: &str) -> ServiceResult<bool> {
        Ok(self.rows.read().iter().any(|r| r.owner_id == owner_id))
    }

    async fn list_all(&self) -> ServiceResult<Vec<Restaurant>> {
        Ok(self.rows.read().clone())
    }

    async fn list_discoverable(&self) -> ServiceResult<Vec<Restaurant>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|r| r.is_discoverable())
            .cloned()
            .collect())
    }

    async fn set_review(
        &self,
        id: &str,
        status: RestaurantStatus,
    ) -> ServiceResult<Option<Restaurant>> {
        let mut rows = self.rows.write();
        Ok(rows.iter_mut().find(|r| r.id == id).map(|r| {
            r.status = status;
            r.approved = status == RestaurantStatus::Approved;
            r.clone()
        }))
    }

    async fn apply_update(
        &self,
        id: &str,
        patch: &RestaurantUpdate,
    ) -> ServiceResult<Option<Restaurant>> {
        let mut rows = self.rows.write();
        if let Some(phone) = &patch.phone
            && rows.iter().any(|r| &r.phone == phone && r.id != id)
        {
            return Err(AppError::with_message(
                ErrorCode::RestaurantAlreadyExists,
                "Phone number already used by another restaurant",
            )
            .into());
        }

        let Some(r) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &patch.name {
            r.name = v.clone();
        }
        if let Some(v) = &patch.phone {
            r.phone = v.clone();
        }
        if let Some(v) = &patch.address {
            r.address = v.clone();
        }
        if let Some(v) = &patch.cuisine_type {
            r.cuisine_type = v.clone();
        }
        if patch.description.is_some() {
            r.description = patch.description.clone();
        }
        if patch.opening_hours.is_some() {
            r.opening_hours = patch.opening_hours.clone();
        }
        if patch.closing_hours.is_some() {
            r.closing_hours = patch.closing_hours.clone();
        }
        if let Some(v) = patch.is_open {
            r.is_open = v;
        }
        if patch.location.is_some() {
            r.location = patch.location;
        }
        Ok(Some(r.clone()))
    }
}
