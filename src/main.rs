//! Boat Budget Server
//!
//! REST API server for boat records and refit budgets.

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boatbudget_server::{
    api,
    config::{AppConfig, DatabaseBackend},
    repository::{boats::BoatsRepository, memory::MemoryBoatStore, BoatStore},
    services::{objects, seed, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("boatbudget_server={},tower_http=debug", config.logging.level).into());

    let json = config.logging.format.eq_ignore_ascii_case("json");
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Starting Boat Budget Server v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn BoatStore> = match config.database.backend {
        DatabaseBackend::Postgres => {
            // Create database connection pool
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("./migrations").run(&pool).await?;

            tracing::info!("Database migrations completed");

            Arc::new(BoatsRepository::new(pool))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using the in-memory boat store, records are lost on restart");
            Arc::new(MemoryBoatStore::new())
        }
    };

    let object_store = objects::from_config(&config.storage)?;
    let services = Services::new(store, object_store, config.storage.max_upload_bytes);

    if let Some(path) = &config.seed.path {
        let seeds = seed::load_seed_file(path).await?;
        services.boats.import(seeds).await?;
    }

    // Save server address before moving config
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
