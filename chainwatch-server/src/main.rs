//! chainwatch server
//!
//! Block explorer backend: collects block data from chain notifications and
//! serves it over a read-only HTTP API.

mod api;
mod config;
mod consumers;
mod server;
mod shutdown;
mod state;

use chainwatch_core::config::FeatureFlags;
use chainwatch_core::events::NotificationHub;
use chainwatch_core::processors::StagedBlocks;
use chainwatch_core::store::{MemoryBlockStore, StatusStore};
use clap::Parser;
use config::{ConfigLoader, Overrides};
use consumers::Consumers;
use server::{build_router, run_server};
use shutdown::shutdown_signal;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

/// How long consumers get to drain their channels after the hub closes.
const CONSUMER_GRACE: Duration = Duration::from_secs(10);

/// chainwatch - block explorer backend
#[derive(Parser, Debug)]
#[command(name = "chainwatch-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./chainwatch.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:7777)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Disable block, stake and watched-address monitoring.
    /// Mempool monitoring is controlled by --monitor-mempool alone
    #[arg(long, default_value = "false")]
    no_monitor: bool,

    /// Monitor mempool transactions
    #[arg(long, default_value = "false")]
    monitor_mempool: bool,

    /// Watch an address (repeatable)
    #[arg(long = "watch-address", value_name = "ADDRESS")]
    watch_addresses: Vec<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            listen: self.listen,
            no_monitor: self.no_monitor,
            monitor_mempool: self.monitor_mempool,
            watch_addresses: self.watch_addresses.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting chainwatch-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let overrides = args.overrides();
    let config_loader = ConfigLoader::new(&args.config, overrides);
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Allocate notification channels for the enabled features
    let flags = FeatureFlags::from_config(&loaded_config.monitor);
    let hub = Arc::new(NotificationHub::initialize(&flags));

    let store = Arc::new(MemoryBlockStore::new());
    let status = StatusStore::new();
    // No chain front end ships with the binary; collectors idle until a
    // producer stages blocks into this source.
    let staged = StagedBlocks::new();
    tracing::warn!("No chain front end attached, block data will not be collected");

    let consumers =
        Consumers::spawn(&hub, Arc::new(staged), store.clone(), status.clone()).await;
    tracing::info!(consumers = consumers.count(), "Consumers started");

    // Build the router
    let state = AppState::new(store, status);
    let router = build_router(state);

    // Run the server
    let listen_addr = loaded_config.server.listen;
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr, shutdown_signal()).await;

    // Close channels and let consumers drain
    consumers.stop(&hub, CONSUMER_GRACE).await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
