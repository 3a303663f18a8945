//! Application state

use std::sync::Arc;

use axum::extract::FromRef;
use shared::auth::JwtService;
use shared::collaborator::http_client;
use shared::config::BoxError;
use shared::identity::{HttpIdentityClient, IdentityClient, LocationResolver};
use sqlx::PgPool;

use crate::config::Config;
use crate::db::{MemoryRestaurantStore, PgRestaurantStore, RestaurantStore};
use crate::directory::RestaurantDirectory;
use crate::geocoding::{Geocoder, GoogleGeocoder};

/// Shared application state, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtService,
    pub directory: RestaurantDirectory,
    pub locations: LocationResolver,
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl AppState {
    /// Build state from configuration: connect and migrate the database (if
    /// configured) and create the collaborator clients.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn RestaurantStore> = match &config.database_url {
            Some(url) => {
                let pool = PgPool::connect(url).await?;
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Connected to PostgreSQL");
                Arc::new(PgRestaurantStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory restaurant store");
                Arc::new(MemoryRestaurantStore::new())
            }
        };

        let http = http_client(config.collaborator_timeout)?;
        let geocoder = Arc::new(GoogleGeocoder::new(
            http.clone(),
            &config.geocoding_base_url,
            &config.google_maps_api_key,
        ));
        let identity = Arc::new(HttpIdentityClient::new(http, &config.user_service_url));

        Ok(Self::from_parts(
            JwtService::new(&config.jwt_secret),
            store,
            geocoder,
            identity,
        ))
    }

    /// Assemble state from ready-made parts
    pub fn from_parts(
        jwt: JwtService,
        store: Arc<dyn RestaurantStore>,
        geocoder: Arc<dyn Geocoder>,
        identity: Arc<dyn IdentityClient>,
    ) -> Self {
        Self {
            jwt,
            directory: RestaurantDirectory::new(store, geocoder),
            locations: LocationResolver::new(identity),
        }
    }
}
