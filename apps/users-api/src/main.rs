use axum::Router;
use axum_helpers::server::{create_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{handlers, PgUserRepository, UserService};
use tracing::info;

mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    // Connect to PostgreSQL, retrying transient startup failures
    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    // Bring the schema up to date before serving traffic
    database::postgres::run_migrations::<migration::Migrator>(&db, "users_api")
        .await
        .map_err(|e| eyre::eyre!("Migration failed: {}", e))?;

    let repository = PgUserRepository::new(db.clone());
    let service = UserService::new(repository);

    // Domain routers apply their own state; compose them under /api
    let api_routes = Router::new().nest("/users", handlers::router(service));

    // create_router adds docs and middleware to our composed routes
    let router = create_router::<openapi::ApiDoc>(api_routes);

    info!("Starting users API");

    create_app(router, &config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Shutting down: closing database connections");
    match db.close().await {
        Ok(_) => info!("PostgreSQL connection closed successfully"),
        Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
    }

    info!("Users API shutdown complete");
    Ok(())
}
