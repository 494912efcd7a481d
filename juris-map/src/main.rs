//! juris-map - study map service
//!
//! Serves the phase map of the gamified legal-study platform over HTTP.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use juris_common::config::{load_config, resolve_database_path};
use juris_common::db::init_database;
use juris_map::service::purge_caches;
use juris_map::{build_router, AppState};
use tokio::signal;
use tracing::{debug, info};

/// Interval of the background cache purge
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Command-line arguments for juris-map
#[derive(Parser, Debug)]
#[command(name = "juris-map")]
#[command(about = "Phase map service for Juris")]
#[command(version)]
struct Args {
    /// TOML config file (overrides JURIS_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides JURIS_DATABASE)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5740
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging level comes from the config file, so it is read first
    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting Juris map service (juris-map) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db_path = resolve_database_path(args.database.as_deref(), &config);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let bind_addr = args
        .bind
        .unwrap_or_else(|| config.server.bind_addr.clone());

    let state = AppState::new(pool, config);

    let purge_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = purge_caches(&purge_state).await;
            if removed > 0 {
                debug!("Purged {} expired cache entries", removed);
            }
        }
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!("juris-map listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
