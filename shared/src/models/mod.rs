//! Data models
//!
//! Shared between the services and their clients (via API).
//! JSON field names are camelCase; IDs are UUID strings and timestamps are
//! Unix milliseconds.

pub mod order;
pub mod payment;
pub mod restaurant;
pub mod role;

// Re-exports
pub use order::*;
pub use payment::*;
pub use restaurant::*;
pub use role::*;
