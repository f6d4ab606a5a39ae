use anyhow::Context;
use meteo_api::common::auth::PlaintextVerifier;
use meteo_api::common::state::AppState;
use meteo_api::config::Config;
use meteo_api::routes;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up tracing/logging
    tracing_subscriber::fmt::init();
    tracing::info!("Starting server...");

    // Load configuration and environment variables to pass to the application
    let config: Config = Config::from_env();

    let db_url = config.db_url.as_deref().context("no database URL configured")?;
    let db: DatabaseConnection = Database::connect(db_url)
        .await
        .context("could not connect to the database")?;

    if db.ping().await.is_ok() {
        tracing::info!("Connected to the database");
    } else {
        tracing::warn!("Could not connect to the database");
    }

    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;
    tracing::info!("DB migrations complete");

    tracing::info!(
        "Starting server {} ({} deployment) ...",
        config.app_name,
        config.deployment.to_uppercase()
    );

    let addr: std::net::SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("invalid BIND_ADDRESS {}", config.bind_address))?;
    tracing::info!("Listening on {addr}");

    let state = AppState::new(db, config, Arc::new(PlaintextVerifier));
    let router = routes::build_router(&state);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router.into_make_service()).await?;
    Ok(())
}
