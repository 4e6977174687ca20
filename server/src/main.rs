//! Tablesync Server binary.

use tablesync_server::client::DocApi;
use tablesync_server::config::Config;
use tablesync_server::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tablesync_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Tablesync Server on {}:{}", config.host, config.port);
    tracing::info!(
        "Remote service {} (source document {}, {} rows per request)",
        config.api_server,
        config.source_doc_id,
        config.client.chunk_size
    );
    if config.client.dry_run {
        tracing::warn!("Dry run enabled: changes are logged, not sent");
    }

    // Build application state
    let source = DocApi::new(config.source_location(), config.client.clone())?;
    let addr = format!("{}:{}", config.host, config.port);
    let app = tablesync_server::app(AppState::new(config, source));

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
