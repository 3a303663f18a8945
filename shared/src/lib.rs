//! Shared types for the food delivery services
//!
//! Error system, domain models, great-circle distance, access control and the
//! identity collaborator client used by the restaurant, order and payment
//! services.

pub mod auth;
pub mod collaborator;
pub mod config;
pub mod error;
pub mod geo;
pub mod identity;
pub mod logger;
pub mod models;
pub mod util;
pub mod validation;

// Re-exports
pub use axum::Json;
pub use error::{AppError, AppResult, ErrorBody, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};

/// Security event log
///
/// Logged at `warn` on the `security` target.
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::warn!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
