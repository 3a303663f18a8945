//! Application state

use std::sync::Arc;

use axum::extract::FromRef;
use shared::auth::JwtService;
use shared::collaborator::http_client;
use shared::config::BoxError;
use shared::identity::{HttpIdentityClient, IdentityClient};
use sqlx::PgPool;

use crate::config::Config;
use crate::db::{MemoryOrderStore, OrderStore, PgOrderStore};
use crate::ledger::OrderLedger;
use crate::restaurants::{HttpRestaurantLookup, RestaurantLookup};

/// Shared application state, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtService,
    pub ledger: OrderLedger,
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn OrderStore> = match &config.database_url {
            Some(url) => {
                let pool = PgPool::connect(url).await?;
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Connected to PostgreSQL");
                Arc::new(PgOrderStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory order store");
                Arc::new(MemoryOrderStore::new())
            }
        };

        let http = http_client(config.collaborator_timeout)?;
        let identity = Arc::new(HttpIdentityClient::new(http.clone(), &config.user_service_url));
        let restaurants = Arc::new(HttpRestaurantLookup::new(
            http,
            &config.restaurant_service_url,
        ));

        Ok(Self::from_parts(
            JwtService::new(&config.jwt_secret),
            store,
            identity,
            restaurants,
        ))
    }

    pub fn from_parts(
        jwt: JwtService,
        store: Arc<dyn OrderStore>,
        identity: Arc<dyn IdentityClient>,
        restaurants: Arc<dyn RestaurantLookup>,
    ) -> Self {
        Self {
            jwt,
            ledger: OrderLedger::new(store, identity, restaurants),
        }
    }
}
