//! Restaurant collaborator
//!
//! The order service never stores restaurants. Ownership is checked by asking
//! the restaurant service who owns a restaurant.

use async_trait::async_trait;
use serde::Deserialize;
use shared::collaborator::{segment_url, unavailable};
use shared::error::{AppError, AppResult, ErrorCode};

const COLLABORATOR: &str = "restaurant";

#[async_trait]
pub trait RestaurantLookup: Send + Sync {
    /// Owner id of `restaurant_id`; unknown restaurant is `RestaurantNotFound`
    async fn owner_of(&self, restaurant_id: &str) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestaurantOwner {
    owner_id: String,
}

/// `GET {base}/restaurants/{id}` on the restaurant service
#[derive(Debug, Clone)]
pub struct HttpRestaurantLookup {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRestaurantLookup {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RestaurantLookup for HttpRestaurantLookup {
    async fn owner_of(&self, restaurant_id: &str) -> AppResult<String> {
        let url = segment_url(&self.base_url, &["restaurants", restaurant_id])?;
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| unavailable(COLLABORATOR, &e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::new(ErrorCode::RestaurantNotFound)
                .with_detail("restaurantId", restaurant_id));
        }
        if !status.is_success() {
            tracing::warn!(%status, %url, "Restaurant service returned an error status");
            return Err(AppError::collaborator_unavailable(
                COLLABORATOR,
                format!("restaurant service responded with {status}"),
            ));
        }

        let body: RestaurantOwner = resp
            .json()
            .await
            .map_err(|e| unavailable(COLLABORATOR, &e))?;
        Ok(body.owner_id)
    }
}
