//! Restaurant service
//!
//! Restaurant submission and review, owner self-service updates and
//! nearby-restaurant search for the food delivery platform.

pub mod api;
pub mod config;
pub mod db;
pub mod directory;
pub mod geocoding;
pub mod state;

pub use api::create_router;
pub use config::Config;
pub use state::AppState;
