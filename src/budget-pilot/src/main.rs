//! BudgetPilot — marketing budget planning and tracking backend.
//!
//! Main entry point that wires configuration, the campaign store,
//! persistence, and the API server.

use budget_api::ApiServer;
use budget_core::config::AppConfig;
use budget_store::{CampaignStore, JsonFileBackend, PersistenceBackend};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "budget-pilot")]
#[command(about = "Marketing budget planning and tracking backend")]
#[command(version)]
struct Cli {
    /// HTTP port (overrides config)
    #[arg(long, env = "BUDGET_PILOT__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Metrics port (overrides config)
    #[arg(long, env = "BUDGET_PILOT__METRICS__PORT")]
    metrics_port: Option<u16>,

    /// Snapshot file path (overrides config)
    #[arg(long, env = "BUDGET_PILOT__PERSISTENCE__SNAPSHOT_PATH")]
    snapshot_path: Option<String>,

    /// Seed the store with demo campaigns on startup
    #[arg(long, default_value_t = false)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "budget_pilot=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("BudgetPilot starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(port) = cli.metrics_port {
        config.metrics.port = port;
    }
    if let Some(path) = cli.snapshot_path {
        config.persistence.snapshot_path = path;
    }

    info!(
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        snapshot_path = %config.persistence.snapshot_path,
        "Configuration loaded"
    );

    // Initialize the campaign store
    let store = Arc::new(CampaignStore::new());
    if cli.seed_demo {
        store.seed_demo_data();
    }

    let backend: Arc<dyn PersistenceBackend> =
        Arc::new(JsonFileBackend::new(&config.persistence.snapshot_path));

    let api_server = ApiServer::new(config, store.clone(), backend.clone());

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    // Spawn the periodic snapshot sync; the dirty flag makes idle passes free.
    let store_for_sync = store.clone();
    let backend_for_sync = backend.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            if let Err(e) = store_for_sync.sync(backend_for_sync.as_ref()) {
                warn!(error = %e, "Periodic snapshot sync failed");
            }
        }
    });

    info!("BudgetPilot is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
