//! catalog-cloud: category tree and product placement service
//!
//! Publishes a category tree as a nested-set table, binds products to leaf
//! categories, and answers subtree / breadcrumb queries over HTTP.

use catalog_cloud::AppState;
use catalog_cloud::api;
use catalog_cloud::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting catalog-cloud (env: {})", config.environment);

    let state = AppState::from_config(&config).await?;
    let shutdown = state.shutdown.clone();
    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("catalog-cloud HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
            tracing::info!("Shutdown requested, cancelling in-flight requests");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
