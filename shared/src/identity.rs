//! Identity collaborator
//!
//! The user service owns profiles. This module fetches the caller's profile
//! with their own bearer token and normalizes the two location shapes the user
//! service has used over time:
//!
//! ```json
//! { "location": { "latitude": 6.9, "longitude": 79.8 } }
//! { "latitude": 6.9, "longitude": 79.8 }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::collaborator::{join_url, unavailable};
use crate::error::{AppError, AppResult, ErrorCode};
use crate::geo::Coordinates;

const COLLABORATOR: &str = "user";

/// Location as it may appear on the wire, either half possibly missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PartialLocation {
    fn complete(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Coordinates::new(lat, lon))
            }
            _ => None,
        }
    }
}

/// User profile as returned by `GET /profile`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub address: Option<String>,
    pub location: Option<PartialLocation>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Profile {
    /// Nested `location` wins when complete, then the flat pair.
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location
            .as_ref()
            .and_then(PartialLocation::complete)
            .or_else(|| {
                PartialLocation {
                    latitude: self.latitude,
                    longitude: self.longitude,
                }
                .complete()
            })
    }
}

#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Fetch the profile belonging to `token`
    async fn fetch_profile(&self, token: &str) -> AppResult<Profile>;
}

/// `reqwest` implementation against the user service
#[derive(Debug, Clone)]
pub struct HttpIdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn fetch_profile(&self, token: &str) -> AppResult<Profile> {
        let url = join_url(&self.base_url, "/profile");
        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| unavailable(COLLABORATOR, &e))?;

        let status = resp.status();
        match status.as_u16() {
            200..=299 => resp
                .json::<Profile>()
                .await
                .map_err(|e| unavailable(COLLABORATOR, &e)),
            404 => Err(AppError::with_message(
                ErrorCode::UserNotFound,
                "User not found in user service",
            )),
            401 | 403 => Err(AppError::invalid_token("User service rejected the token")),
            _ => {
                tracing::warn!(%status, url, "User service returned an error status");
                Err(AppError::collaborator_unavailable(
                    COLLABORATOR,
                    format!("user service responded with {status}"),
                ))
            }
        }
    }
}

/// Resolves a caller's coordinates through the identity collaborator
#[derive(Clone)]
pub struct LocationResolver {
    identity: Arc<dyn IdentityClient>,
}

impl LocationResolver {
    pub fn new(identity: Arc<dyn IdentityClient>) -> Self {
        Self { identity }
    }

    /// `Ok(None)` means "no location on file", not a failure.
    pub async fn resolve_location(&self, user: &CurrentUser) -> AppResult<Option<Coordinates>> {
        let profile = self.identity.fetch_profile(&user.token).await?;
        let coordinates = profile.coordinates();
        if coordinates.is_none() {
            tracing::debug!(user_id = %user.id, "Profile has no usable location");
        }
        Ok(coordinates)
    }
}
