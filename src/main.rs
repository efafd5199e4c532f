use std::net::SocketAddr;
use std::sync::Arc;

use storechat::api::build_router;
use storechat::api::middleware::AppState;
use storechat::config::Config;
use storechat::database::Database;
use storechat::services::{ChatService, DbRoster};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storechat=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Initialize database connection
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Run migrations
    db.run_migrations().await?;
    tracing::info!("Database migrations applied");

    // Wire the chat service against the table-backed roster
    let roster = Arc::new(DbRoster::new(db.clone()));
    let chat_service = ChatService::new(db.clone(), roster);

    let state = AppState {
        db,
        chat_service,
        poll_interval_seconds: config.poll_interval_seconds,
    };

    // Build router
    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
