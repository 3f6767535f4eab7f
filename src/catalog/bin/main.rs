use std::error::Error;
use tracing::{info, warn};
use book_catalog::catalog::controller::build_router;
use book_catalog::catalog::factory::create_catalog_service;
use book_catalog::core::controller::AppState;
use book_catalog::core::domain::Configuration;
use book_catalog::utils::sql::setup_tracing;

// Environment: DATABASE_URL, BOOKS_BRANCH, BOOKS_MAX_CONNECTIONS, BOOKS_BIND_ADDR, BOOKS_LOG_LEVEL.
// Without DATABASE_URL the service runs against a private in-memory database.

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let (config, warnings) = Configuration::from_env();
    setup_tracing(config.tracing_level());
    for warning in warnings {
        warn!("{}", warning);
    }

    let store = config.store();
    let catalog = create_catalog_service(&config, store).await?;
    let app = build_router(AppState::new(config.clone(), catalog));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(branch = %config.branch_id, store = ?store, addr = %config.bind_addr, "catalog listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("catalog stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
    }
}
