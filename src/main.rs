use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsfeed::config::Config;
use newsfeed::db::Database;
use newsfeed::routes::{self, AppState};
use newsfeed::service::NewsService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsfeed=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::load("newsfeed.toml") {
        Ok(config) => config,
        Err(err) => {
            info!("No usable newsfeed.toml ({err}), falling back to defaults");
            Config::default()
        }
    };

    // Initialize database
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| config.database_url.clone());
    let db = Database::new(&database_url).await?;
    db.initialize().await?;
    info!("Database initialized");

    let db = Arc::new(db);

    // Create app state
    let service = NewsService::new(db.clone(), Duration::from_secs(config.query_timeout_secs));
    let state = Arc::new(AppState {
        service,
        default_limit: config.default_limit,
        max_limit: config.max_limit,
    });

    // Build router
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
