//! Lodgr provisioning — connects to SurrealDB and applies pending schema
//! migrations.

use std::process::ExitCode;

use lodgr_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the process environment still applies.
    let dotenv = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lodgr_db=info,lodgr_provision=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    let config = DbConfig::from_env();
    tracing::info!("Starting Lodgr provisioning...");

    let manager = match DbManager::connect(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to SurrealDB");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = lodgr_db::run_migrations(manager.client()).await {
        tracing::error!(error = %e, "Schema provisioning failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("Lodgr schema is up to date.");
    ExitCode::SUCCESS
}
