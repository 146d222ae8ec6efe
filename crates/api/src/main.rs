use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use domain::services::SensorService;
use persistence::repositories::SensorRepository;
use sensor_service_api::{app, config::Config, middleware, services::TelemetryClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting sensor service v{}", env!("CARGO_PKG_VERSION"));

    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config)?;

    // Refuse to serve without a reachable database.
    if let Err(e) = persistence::db::check_connection(&pool).await {
        error!(error = %e, "Database connection error");
        return Err(e).context("database connectivity probe failed");
    }
    info!("Database connected successfully");

    let repository = SensorRepository::new(pool.clone());
    let telemetry = TelemetryClient::new(&config.telemetry)?;
    info!(base_url = telemetry.base_url(), "Telemetry client configured");

    let sensor_service = SensorService::new(Arc::new(repository), Arc::new(telemetry));
    let app = app::create_app(config.clone(), sensor_service);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Sensor service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down server...");
    pool.close().await;
    info!("Database connection closed");

    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
