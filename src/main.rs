use api_rest::AppState;
use medvault_core::{CoreConfig, Database};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the MedVault application
///
/// Loads `.env`, resolves configuration, opens and migrates the database, then serves the
/// REST API (with Swagger UI at `/swagger-ui`).
///
/// # Environment Variables
/// - `MEDVAULT_REST_ADDR`: REST server address (default: "0.0.0.0:8080")
/// - `APP_ENV`: `development`, `production` or `test` (default: "development")
/// - `DATABASE_URL`: SQLite URL (default: "sqlite://medvault.db?mode=rwc")
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `JWT_SECRET`: token signing secret, required outside development
/// - `JWT_EXPIRATION_HOURS`: token lifetime (default: 24)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, database start-up or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medvault_run=info".parse()?)
                .add_directive("medvault_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("MEDVAULT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());

    let cfg = CoreConfig::from_process_env()?;
    tracing::info!("Environment: {:?}", cfg.environment());

    let db = Database::connect(&cfg).await?;
    db.migrate().await?;

    tracing::info!("++ Starting MedVault REST on {}", rest_addr);
    api_rest::serve(AppState::new(&cfg, db), &rest_addr).await
}
