//! # CollabHub API Server
//!
//! Binary entry point for the CollabHub collaboration server. Loads
//! configuration, prepares the database (pool + migrations), builds the
//! Axum router and serves it until interrupted.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/collabhub cargo run -p collabhub-api
//! ```

use collabhub_api::app::{build_router, AppState};
use collabhub_api::config::Config;
use collabhub_core::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "collabhub_api=debug,collabhub_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        "CollabHub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Prepare the database: create it if missing, then run migrations
    migrations::ensure_database_exists(&config.database.url).await?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let state = AppState::new(db, config.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    Ok(())
}
