//! Restaurant service configuration

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
    /// Shared identity token secret
    pub jwt_secret: String,
    /// User service base URL (profile lookups)
    pub user_service_url: String,
    pub google_maps_api_key: String,
    /// Geocoding API origin, overridable for tests and proxies
    pub geocoding_base_url: String,
    /// Budget for each collaborator call
    pub collaborator_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = environment();

        Ok(Self {
            http_port: env_parse("HTTP_PORT", 5002),
            database_url: env_opt("DATABASE_URL"),
            jwt_secret: require_secret("JWT_SECRET", &environment)?,
            user_service_url: env_or("USER_SERVICE_URL", "http://localhost:5001/api/users"),
            google_maps_api_key: require_secret("GOOGLE_MAPS_API_KEY", &environment)?,
            geocoding_base_url: env_or("GEOCODING_BASE_URL", "https://maps.googleapis.com"),
            collaborator_timeout: Duration::from_millis(env_parse(
                "COLLABORATOR_TIMEOUT_MS",
                DEFAULT_TIMEOUT_MS,
            )),
            environment,
        })
    }
}
