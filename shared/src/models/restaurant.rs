//! Restaurant Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geo::Coordinates;

/// Review state of a submitted restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestaurantStatus {
    Pending,
    Approved,
    Rejected,
}

impl RestaurantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RestaurantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestaurantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown restaurant status: {other}")),
        }
    }
}

/// Restaurant entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub cuisine_type: String,
    pub description: Option<String>,
    pub opening_hours: Option<String>,
    pub closing_hours: Option<String>,
    pub is_open: bool,
    pub approved: bool,
    pub status: RestaurantStatus,
    pub rating: f64,
    /// Absent until the address has been geocoded
    pub location: Option<Coordinates>,
    pub created_at: i64,
}

impl Restaurant {
    /// Approved, open and geocoded: only these show up in nearby search.
    pub fn is_discoverable(&self) -> bool {
        self.approved
            && self.status == RestaurantStatus::Approved
            && self.is_open
            && self
                .location
                .is_some_and(|l| l.latitude.is_finite() && l.longitude.is_finite())
    }
}

/// Submit restaurant payload
///
/// Required fields are optional here so that a missing field is reported as a
/// validation error rather than a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestaurantCreate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cuisine_type: Option<String>,
    pub description: Option<String>,
    pub opening_hours: Option<String>,
    pub closing_hours: Option<String>,
    pub location: Option<Coordinates>,
}

/// Owner self-service update payload
///
/// Review fields (`status`, `approved`), `ownerId` and `email` are not part of
/// the patch and unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cuisine_type: Option<String>,
    pub description: Option<String>,
    pub opening_hours: Option<String>,
    pub closing_hours: Option<String>,
    pub is_open: Option<bool>,
    pub location: Option<Coordinates>,
}

/// Restaurant with its distance from the search centre
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRestaurant {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    /// Kilometres, rounded to 2 decimals
    pub distance: f64,
}

/// Nearby search response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyResponse {
    pub user_location: Coordinates,
    pub search_radius: f64,
    pub count: usize,
    pub restaurants: Vec<NearbyRestaurant>,
}
