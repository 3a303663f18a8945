//! payment-service: payment intents and webhook reconciliation

use payment_service::{AppState, Config, create_router};
use shared::config::BoxError;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    shared::logger::init_logger("payment_service=info,shared=info,tower_http=info");

    let config = Config::from_env()?;
    tracing::info!(
        "Starting payment-service (env: {}, currency: {})",
        config.environment,
        config.currency
    );

    let state = AppState::new(&config).await?;
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("payment-service listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
