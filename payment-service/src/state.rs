//! Application state

use std::sync::Arc;

use shared::collaborator::http_client;
use shared::config::BoxError;
use sqlx::PgPool;

use crate::config::Config;
use crate::correlator::PaymentCorrelator;
use crate::db::{MemoryPaymentStore, PaymentStore, PgPaymentStore};
use crate::stripe::{PaymentProvider, StripeClient};

/// Shared application state, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub correlator: PaymentCorrelator,
    /// Signing secret for incoming webhooks; unverified when `None`
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn PaymentStore> = match &config.database_url {
            Some(url) => {
                let pool = PgPool::connect(url).await?;
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Connected to PostgreSQL");
                Arc::new(PgPaymentStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory payment store");
                Arc::new(MemoryPaymentStore::new())
            }
        };

        if config.stripe_webhook_secret.is_none() {
            tracing::warn!("STRIPE_WEBHOOK_SECRET not set, webhook signatures will not be verified");
        }

        let http = http_client(config.collaborator_timeout)?;
        let provider = Arc::new(StripeClient::new(
            http,
            &config.stripe_api_base,
            &config.stripe_secret_key,
        ));

        Ok(Self::from_parts(
            store,
            provider,
            &config.currency,
            config.stripe_webhook_secret.as_deref(),
        ))
    }

    /// Assemble state from ready-made parts
    pub fn from_parts(
        store: Arc<dyn PaymentStore>,
        provider: Arc<dyn PaymentProvider>,
        currency: &str,
        webhook_secret: Option<&str>,
    ) -> Self {
        Self {
            correlator: PaymentCorrelator::new(store, provider, currency),
            webhook_secret: webhook_secret.map(Arc::from),
        }
    }
}
