// SWIFT Registry - Web Server
// Bootstraps the registry from the dataset, then serves the REST API

use anyhow::{Context, Result};
use std::sync::Arc;
use swift_registry::api::{create_router, AppState};
use swift_registry::{
    logging, Config, IngestionOutcome, IngestionPipeline, SqliteRegistry, SwiftCodeService,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();
    tracing::info!("Starting SWIFT registry server {}", swift_registry::VERSION);

    let config = Config::from_env()?;

    let registry = SqliteRegistry::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    tracing::info!("Database opened: {}", config.database_path.display());

    // Runs to completion before the listener is bound; a failure leaves the store as-is
    let outcome = IngestionPipeline::new(&registry)
        .with_batch_size(config.batch_size)
        .ingest_if_empty(&config.data_csv);
    match outcome {
        Ok(IngestionOutcome::Completed(report)) => {
            tracing::info!("Initial data load complete: {}", report.summary());
        }
        Ok(IngestionOutcome::AlreadyPopulated { .. }) => {}
        Err(e) => {
            tracing::error!(
                "Failed to load data from CSV file {}: {:#}",
                config.data_csv.display(),
                e
            );
        }
    }

    let state = AppState {
        service: SwiftCodeService::new(Arc::new(registry)),
    };
    let app = create_router(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server running on http://{}", addr);
    tracing::info!("API: http://{}/v1/swift-codes", addr);

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
