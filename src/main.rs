// Post Insights Server - normalization, filtering and chart series over post exports

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use post_insights::{
    app_state::AppState,
    config::Config,
    insights_interface::create_insights_router,
};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;
    let store = app_state.store.clone();

    // Build main application router
    let app = Router::new()
        .nest("/api/v1", create_insights_router(app_state))
        .layer(CorsLayer::permissive());

    let addr = config.server_address();
    info!("Post Insights server starting: addr=http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain queued snapshots before exit
    store.flush().await;
    info!("Post Insights server stopped");

    Ok(())
}
