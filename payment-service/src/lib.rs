//! Payment service
//!
//! Creates Stripe payment intents for orders, records them locally and
//! settles them from Stripe webhook events.

pub mod api;
pub mod config;
pub mod correlator;
pub mod db;
pub mod state;
pub mod stripe;

pub use api::create_router;
pub use config::Config;
pub use state::AppState;
