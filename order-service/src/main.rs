//! order-service: order ledger and status lifecycle

use order_service::{AppState, Config, create_router};
use shared::config::BoxError;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    shared::logger::init_logger("order_service=info,shared=info,tower_http=info");

    let config = Config::from_env()?;
    tracing::info!("Starting order-service (env: {})", config.environment);

    let state = AppState::new(&config).await?;
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("order-service listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
