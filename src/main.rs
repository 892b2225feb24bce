//! Route gateway binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                    ROUTE GATEWAY                      │
//!                    │                                                       │
//!   gateway.toml ────┼─▶ config ──▶ routing::spec ──▶ routing::table ──┐     │
//!                    │     │                                            │     │
//!                    │     ├──────▶ filter::validator ──▶ admission ────┤     │
//!                    │     │                                            │     │
//!                    │     └──────▶ net::transport / net::cors ─────────┤     │
//!                    │                                                  ▼     │
//!   Client ──────────┼─▶ request id ─▶ CORS ─▶ filter ─▶ dispatch ──────────┼──▶ Destination
//!                    │                                                       │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use route_gateway::config::loader::load_config;
use route_gateway::config::watcher::ConfigWatcher;
use route_gateway::filter::builtin::{AccessLogFilter, ACCESS_LOG_FILTER};
use route_gateway::lifecycle::signals::spawn_signal_listener;
use route_gateway::observability::init_logging;
use route_gateway::{compile_gateway, FilterRegistry, GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "route-gateway")]
#[command(about = "Declarative reverse-proxy gateway", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,

    /// Recompile routes when the configuration file changes.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_logging(&config.logging.level);

    tracing::info!(
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let mut registry = FilterRegistry::new();
    registry.register_filter(ACCESS_LOG_FILTER, std::sync::Arc::new(AccessLogFilter));

    let compiled = compile_gateway(&config, &registry, &registry)?;
    let bind_address = config.listener.bind_address.clone();
    let server = GatewayServer::new(config, compiled)?;

    let (config_updates, _watcher) = if cli.watch {
        let (watcher, updates) = ConfigWatcher::new(&cli.config);
        (updates, Some(watcher.run()?))
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (updates, None)
    };

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
