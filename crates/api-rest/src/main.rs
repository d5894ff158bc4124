//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the MedVault REST API on its own.
//!
//! ## Intended use
//! Useful during development when only the HTTP server (with OpenAPI/Swagger UI) is wanted.
//! The workspace's main `medvault-run` binary starts the same server after the usual start-up
//! checks.

use api_rest::AppState;
use medvault_core::{CoreConfig, Database};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the MedVault REST API server
///
/// # Environment Variables
/// - `MEDVAULT_REST_ADDR`: Server address (default: "0.0.0.0:8080")
/// - `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`, `JWT_SECRET`, `JWT_EXPIRATION_HOURS`,
///   `APP_ENV`: see [`CoreConfig::from_process_env`]
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the database cannot be opened or migrated, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("medvault_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MEDVAULT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());

    let cfg = CoreConfig::from_process_env()?;
    let db = Database::connect(&cfg).await?;
    db.migrate().await?;

    tracing::info!("-- Starting MedVault REST API on {}", addr);
    api_rest::serve(AppState::new(&cfg, db), &addr).await
}
