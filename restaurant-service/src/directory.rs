//! Restaurant directory
//!
//! Submission and review, owner self-service updates, and nearby search.

use std::sync::Arc;

use shared::auth::CurrentUser;
use shared::error::{AppError, ErrorCode, ServiceResult};
use shared::geo::{Coordinates, round_km};
use shared::models::{
    NearbyRestaurant, Restaurant, RestaurantCreate, RestaurantStatus, RestaurantUpdate,
};
use shared::util::{new_id, now_millis};
use shared::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, require_text,
    validate_email, validate_optional_text, validate_phone, validate_required_text,
};

use crate::db::RestaurantStore;
use crate::geocoding::Geocoder;

/// Search radius used when the caller gives none
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 5.0;

/// Interpret the `maxDistance` query parameter.
///
/// Missing, unparseable or zero falls back to the default. Negative or
/// non-finite values are rejected.
pub fn parse_max_distance(raw: Option<&str>) -> Result<f64, AppError> {
    let Some(value) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_MAX_DISTANCE_KM);
    };
    match value.parse::<f64>() {
        Err(_) => Ok(DEFAULT_MAX_DISTANCE_KM),
        Ok(km) if !km.is_finite() || km < 0.0 => Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "maxDistance must be a non-negative number",
        )
        .with_detail("field", "maxDistance")),
        Ok(km) if km == 0.0 => Ok(DEFAULT_MAX_DISTANCE_KM),
        Ok(km) => Ok(km),
    }
}

/// Rank candidates by distance from `center`.
///
/// Ineligible restaurants are skipped. Filtering uses the full-precision
/// distance; only the returned value is rounded. The sort is stable so equal
/// distances keep the candidates' order.
pub fn rank_nearby(
    center: Coordinates,
    candidates: Vec<Restaurant>,
    max_km: f64,
) -> Vec<NearbyRestaurant> {
    let mut within: Vec<(f64, Restaurant)> = candidates
        .into_iter()
        .filter(Restaurant::is_discoverable)
        .filter_map(|r| {
            let location = r.location?;
            let km = center.distance_to(&location);
            (km <= max_km).then_some((km, r))
        })
        .collect();

    within.sort_by(|a, b| a.0.total_cmp(&b.0));

    within
        .into_iter()
        .map(|(km, restaurant)| NearbyRestaurant {
            restaurant,
            distance: round_km(km),
        })
        .collect()
}

#[derive(Clone)]
pub struct RestaurantDirectory {
    store: Arc<dyn RestaurantStore>,
    geocoder: Arc<dyn Geocoder>,
}

impl RestaurantDirectory {
    pub fn new(store: Arc<dyn RestaurantStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    /// Submit a restaurant for review. Stored as `pending`.
    pub async fn submit(
        &self,
        owner: &CurrentUser,
        draft: RestaurantCreate,
    ) -> ServiceResult<Restaurant> {
        let name = require_text(draft.name, "name", MAX_NAME_LEN)?;
        let email = require_text(draft.email, "email", MAX_SHORT_TEXT_LEN)?.to_lowercase();
        let phone = require_text(draft.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        let address = require_text(draft.address, "address", MAX_ADDRESS_LEN)?;
        let cuisine_type = require_text(draft.cuisine_type, "cuisineType", MAX_NAME_LEN)?;
        validate_email(&email)?;
        validate_phone(&phone)?;
        validate_optional_text(&draft.description, "description", MAX_NOTE_LEN)?;
        validate_optional_text(&draft.opening_hours, "openingHours", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&draft.closing_hours, "closingHours", MAX_SHORT_TEXT_LEN)?;
        if let Some(loc) = draft.location {
            validate_coordinates(loc)?;
        }

        if self.store.find_by_contact(&email, &phone).await?.is_some() {
            return Err(AppError::with_message(
                ErrorCode::RestaurantAlreadyExists,
                "Restaurant with this email or phone already exists",
            )
            .into());
        }

        let location = match draft.location {
            Some(loc) => loc,
            None => self.geocoder.geocode(&address).await?,
        };

        let restaurant = Restaurant {
            id: new_id(),
            owner_id: owner.id.clone(),
            name,
            email,
            phone,
            address,
            cuisine_type,
            description: draft.description,
            opening_hours: draft.opening_hours,
            closing_hours: draft.closing_hours,
            is_open: true,
            approved: false,
            status: RestaurantStatus::Pending,
            rating: 0.0,
            location: Some(location),
            created_at: now_millis(),
        };
        self.store.insert(&restaurant).await?;

        tracing::info!(
            restaurant_id = %restaurant.id,
            owner_id = %restaurant.owner_id,
            "Restaurant submitted for approval"
        );
        Ok(restaurant)
    }

    /// Approve a restaurant. Re-approving is a no-op success.
    pub async fn approve(&self, id: &str) -> ServiceResult<Restaurant> {
        self.review(id, RestaurantStatus::Approved).await
    }

    /// Reject a restaurant. Re-rejecting is a no-op success.
    pub async fn reject(&self, id: &str) -> ServiceResult<Restaurant> {
        self.review(id, RestaurantStatus::Rejected).await
    }

    async fn review(&self, id: &str, status: RestaurantStatus) -> ServiceResult<Restaurant> {
        let restaurant = self
            .store
            .set_review(id, status)
            .await?
            .ok_or_else(|| restaurant_not_found(id))?;
        tracing::info!(restaurant_id = %id, status = %status, "Restaurant reviewed");
        Ok(restaurant)
    }

    /// Owner self-service update
    pub async fn update(
        &self,
        owner: &CurrentUser,
        id: &str,
        mut patch: RestaurantUpdate,
    ) -> ServiceResult<Restaurant> {
        let current = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| restaurant_not_found(id))?;
        if current.owner_id != owner.id {
            shared::security_log!(
                "WARN",
                "not_restaurant_owner",
                user_id = owner.id.clone(),
                restaurant_id = id.to_string()
            );
            return Err(AppError::with_message(
                ErrorCode::NotRestaurantOwner,
                "You can only update your own restaurants",
            )
            .into());
        }

        patch.name = trimmed(patch.name);
        patch.phone = trimmed(patch.phone);
        patch.address = trimmed(patch.address);
        patch.cuisine_type = trimmed(patch.cuisine_type);
        if let Some(name) = &patch.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        if let Some(cuisine) = &patch.cuisine_type {
            validate_required_text(cuisine, "cuisineType", MAX_NAME_LEN)?;
        }
        if let Some(address) = &patch.address {
            validate_required_text(address, "address", MAX_ADDRESS_LEN)?;
        }
        validate_optional_text(&patch.description, "description", MAX_NOTE_LEN)?;
        validate_optional_text(&patch.opening_hours, "openingHours", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&patch.closing_hours, "closingHours", MAX_SHORT_TEXT_LEN)?;
        if let Some(loc) = patch.location {
            validate_coordinates(loc)?;
        }
        if let Some(phone) = &patch.phone {
            validate_phone(phone)?;
            if phone != &current.phone && self.store.phone_in_use(phone, id).await? {
                return Err(AppError::with_message(
                    ErrorCode::RestaurantAlreadyExists,
                    "Phone number already used by another restaurant",
                )
                .into());
            }
        }

        let address_changed = patch
            .address
            .as_ref()
            .is_some_and(|a| a != &current.address);
        if address_changed
            && patch.location.is_none()
            && let Some(address) = &patch.address
        {
            patch.location = Some(self.geocoder.geocode(address).await?);
        }

        let updated = self
            .store
            .apply_update(id, &patch)
            .await?
            .ok_or_else(|| restaurant_not_found(id))?;
        tracing::info!(restaurant_id = %id, "Restaurant details updated");
        Ok(updated)
    }

    pub async fn mine(&self, owner: &CurrentUser) -> ServiceResult<Vec<Restaurant>> {
        self.store.list_by_owner(&owner.id).await
    }

    pub async fn owner_exists(&self, owner: &CurrentUser) -> ServiceResult<bool> {
        self.store.owner_exists(&owner.id).await
    }

    pub async fn all(&self) -> ServiceResult<Vec<Restaurant>> {
        self.store.list_all().await
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Restaurant> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| restaurant_not_found(id).into())
    }

    /// Discoverable restaurants within `max_km` of `center`, nearest first
    pub async fn nearby(
        &self,
        center: Coordinates,
        max_km: f64,
    ) -> ServiceResult<Vec<NearbyRestaurant>> {
        let candidates = self.store.list_discoverable().await?;
        Ok(rank_nearby(center, candidates, max_km))
    }
}

fn restaurant_not_found(id: &str) -> AppError {
    AppError::new(ErrorCode::RestaurantNotFound).with_detail("restaurantId", id)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn validate_coordinates(loc: Coordinates) -> Result<(), AppError> {
    let lat_ok = loc.latitude.is_finite() && (-90.0..=90.0).contains(&loc.latitude);
    let lon_ok = loc.longitude.is_finite() && (-180.0..=180.0).contains(&loc.longitude);
    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(AppError::with_message(ErrorCode::ValueOutOfRange, "Invalid coordinates")
            .with_detail("field", "location"))
    }
}
