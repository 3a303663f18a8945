//! Geocoding collaborator (Google Geocoding JSON API)

use async_trait::async_trait;
use serde::Deserialize;
use shared::collaborator::{join_url, unavailable};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::geo::Coordinates;

const COLLABORATOR: &str = "geocoding";

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a street address. "No such place" is `GeocodingFailed`,
    /// an unreachable provider is `CollaboratorUnavailable`.
    async fn geocode(&self, address: &str) -> AppResult<Coordinates>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Google Maps geocoder
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

fn not_geocodable(reason: &str) -> AppError {
    AppError::with_message(
        ErrorCode::GeocodingFailed,
        "Could not determine location from address",
    )
    .with_detail("reason", reason)
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> AppResult<Coordinates> {
        let url = join_url(&self.base_url, "/maps/api/geocode/json");
        let resp = self
            .http
            .get(&url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| unavailable(COLLABORATOR, &e))?;

        if !resp.status().is_success() {
            return Err(AppError::collaborator_unavailable(
                COLLABORATOR,
                format!("geocoding service responded with {}", resp.status()),
            ));
        }

        let body: GeocodeResponse = resp
            .json()
            .await
            .map_err(|e| unavailable(COLLABORATOR, &e))?;

        match body.status.as_str() {
            "OK" => body
                .results
                .first()
                .map(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))
                .ok_or_else(|| not_geocodable("ZERO_RESULTS")),
            "ZERO_RESULTS" | "INVALID_REQUEST" => Err(not_geocodable(&body.status)),
            other => {
                tracing::warn!(status = other, "Geocoding provider refused the request");
                Err(AppError::collaborator_unavailable(
                    COLLABORATOR,
                    format!("geocoding provider returned {other}"),
                ))
            }
        }
    }
}
