//! Enerlens - Building Energy Waste Operational Intelligence
//!
//! HTTP service wrapping the signal-to-insight reasoning pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (./building_config.toml if present)
//! cargo run --release
//!
//! # Override the bind address
//! cargo run --release -- --addr 0.0.0.0:9090
//! ```
//!
//! # Environment Variables
//!
//! - `ENERLENS_CONFIG`: Path to a building_config.toml
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use enerlens::api::{create_app, ServiceState};
use enerlens::config::{self, BuildingConfig};
use enerlens::{AlertManager, ResidualModel, ThresholdStore, WasteAnalyzer};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "enerlens")]
#[command(about = "Enerlens Building Energy Waste Intelligence Service")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default from config, "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a building_config.toml (overrides ENERLENS_CONFIG)
    #[arg(long)]
    config: Option<String>,

    /// Wipe persisted alerts, recommendations, and feedback on startup.
    /// WARNING: destructive and cannot be undone!
    #[arg(long)]
    reset_db: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    // Config: explicit path wins over the standard search order.
    let building_config = match &args.config {
        Some(path) => BuildingConfig::load_from_file(std::path::Path::new(path))
            .with_context(|| format!("failed to load config from {path}"))?,
        None => BuildingConfig::load(),
    };
    let listen_addr = args
        .addr
        .clone()
        .unwrap_or_else(|| building_config.server.listen_addr.clone());
    let db_path = building_config.storage.db_path.clone();
    config::init(building_config);

    if args.reset_db {
        warn!(path = %db_path, "--reset-db: wiping persisted state");
        if let Err(e) = std::fs::remove_dir_all(&db_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(e).context("failed to remove database directory");
            }
        }
    }

    enerlens::storage::init(&db_path)
        .with_context(|| format!("failed to open storage at {db_path}"))?;

    // Restore the threshold snapshot by replaying the feedback log, then the
    // alert store from its trees.
    let thresholds = Arc::new(ThresholdStore::default());
    let feedback_log = enerlens::storage::feedback::load_all();
    for record in &feedback_log {
        thresholds.ingest(record);
    }
    info!(records = feedback_log.len(), "replayed feedback log into threshold store");

    let alerts = Arc::new(AlertManager::from_config());
    let restored_alerts = enerlens::storage::alerts::load_all_alerts();
    let restored_recs = enerlens::storage::alerts::load_all_recommendations();
    for alert in restored_alerts {
        alerts.restore(alert);
    }
    for rec in restored_recs {
        alerts.restore_recommendation(rec);
    }
    info!(alerts = alerts.len(), "restored alert store");

    let state = ServiceState {
        analyzer: WasteAnalyzer::new(Arc::clone(&thresholds)),
        alerts,
        model: Arc::new(ResidualModel),
    };

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!(addr = %listen_addr, "enerlens API listening");

    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            shutdown_signal.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("server error")?;

    info!("enerlens stopped");
    Ok(())
}
