//! Payment service configuration

use std::time::Duration;

use shared::collaborator::DEFAULT_TIMEOUT_MS;
use shared::config::{BoxError, env_opt, env_or, env_parse, environment, require_secret};

#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    pub http_port: u16,
    /// PostgreSQL connection URL; in-memory store when absent
    pub database_url: Option<String>,
    pub stripe_secret_key: String,
    /// Webhook signing secret. Signatures are not checked when unset.
    pub stripe_webhook_secret: Option<String>,
    pub stripe_api_base: String,
    /// ISO currency sent with every payment intent
    pub currency: String,
    pub collaborator_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = environment();

        Ok(Self {
            http_port: env_parse("HTTP_PORT", 5004),
            database_url: env_opt("DATABASE_URL"),
            stripe_secret_key: require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_webhook_secret: env_opt("STRIPE_WEBHOOK_SECRET"),
            stripe_api_base: env_or("STRIPE_API_BASE", "https://api.stripe.com"),
            currency: env_or("PAYMENT_CURRENCY", "usd").to_lowercase(),
            collaborator_timeout: Duration::from_millis(env_parse(
                "COLLABORATOR_TIMEOUT_MS",
                DEFAULT_TIMEOUT_MS,
            )),
            environment,
        })
    }
}
