use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::{error, info};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    // A malformed URI is fatal; an unreachable server is not
    let mongo_client = database::mongodb::connect_lazy(&config.mongodb).await?;
    match database::mongodb::verify_connection(&mongo_client).await {
        Ok(()) => info!("MongoDB connected"),
        Err(e) => error!(error = %e, "MongoDB connection error, continuing without it"),
    }

    let db = config.mongodb.resolve_database(&mongo_client);
    info!(database = db.name(), "Using MongoDB database");

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    api::users::init_indexes(&state).await;

    // Build router with API routes and OpenAPI docs
    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes);

    // Merge health endpoints
    let app = router.merge(health_router(state.config.app));

    info!("Starting Users API with graceful shutdown (30s timeout)");

    let AppState {
        config,
        mongo_client,
        ..
    } = state;

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: closing MongoDB connections");
        mongo_client.shutdown().await;
        info!("MongoDB connection closed successfully");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
