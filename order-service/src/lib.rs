//! Order service
//!
//! Order creation, the order status lifecycle and customer/restaurant order
//! listings.

pub mod api;
pub mod config;
pub mod db;
pub mod ledger;
pub mod restaurants;
pub mod state;

pub use api::create_router;
pub use config::Config;
pub use state::AppState;
