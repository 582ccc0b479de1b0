//! Employee Management - HTTP API for employees, departments and positions.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use employee_management as app;
use tokio::net::TcpListener;

use app::api::{AppState, build_router};
use app::config::{AppConfig, ConfigLoadResult};
use app::db::{self, MemoryStore, SeaUnitOfWorkFactory, UnitOfWorkFactory};

/// HTTP API for employees, departments and positions.
#[derive(Parser)]
#[command(name = "employee-management")]
struct Cli {
    /// Path to config.toml (defaults to the executable's directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Serve from a volatile in-memory store instead of the database
    #[arg(long)]
    in_memory: bool,

    /// Create missing tables before serving
    #[arg(long)]
    init_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    tracing::info!("Employee Management starting...");

    // Determine config path based on mode
    let config_path = match cli.config {
        Some(path) => path,
        None if cli.dev => {
            tracing::info!("Dev mode: loading config from current directory");
            PathBuf::from("config.toml")
        }
        None => AppConfig::default_path(),
    };
    tracing::info!("Config path: {:?}", config_path);

    let config = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => {
            tracing::info!("Config loaded successfully");
            config
        }
        ConfigLoadResult::Missing => {
            tracing::warn!("Config missing, using defaults");
            AppConfig::default()
        }
        ConfigLoadResult::Invalid(e) => {
            return Err(e).with_context(|| format!("Invalid config at {}", config_path.display()));
        }
    };

    let units: Arc<dyn UnitOfWorkFactory> = if cli.in_memory {
        tracing::warn!("Serving from in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(open_database(&config, cli.init_schema).await?)
    };

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    tracing::info!("Listening on http://{}", address);

    axum::serve(listener, build_router(AppState::new(units)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Connect to the configured database and report what it holds.
async fn open_database(config: &AppConfig, init_schema: bool) -> anyhow::Result<SeaUnitOfWorkFactory> {
    let conn = db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    db::test_connection(&conn).await.context("Database is not responding")?;

    if init_schema {
        db::ensure_schema(&conn).await.context("Failed to create schema")?;
    }

    // Log connection info
    if let Ok(version) = db::get_version(&conn).await {
        tracing::info!("Database: {}", version);
    }

    if let Ok(counts) = db::get_table_counts(&conn).await {
        tracing::info!(
            "Tables: {} departments, {} positions, {} employees",
            counts.departments,
            counts.positions,
            counts.employees
        );
    }

    Ok(SeaUnitOfWorkFactory::new(conn, config.database.command_timeout()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
