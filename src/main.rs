//! WebDriver stabilization proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │               STABILITY PROXY                │
//!   Test driver        │  ┌─────────┐   ┌────────────┐                │
//!   ───────────────────┼─▶│  http   │──▶│  routing   │                │
//!                      │  │ server  │   │ classifier │                │
//!                      │  └─────────┘   └─────┬──────┘                │
//!                      │         admin ◀──────┤                       │
//!                      │                      ▼                       │
//!                      │              ┌──────────────┐  execute_async │
//!                      │              │  stabilizer  │────────────────┼──┐
//!                      │              └──────┬───────┘                │  │
//!                      │                     ▼                        │  ▼
//!   Response           │              ┌──────────────┐   command      │  WebDriver
//!   ◀──────────────────┼──────────────│   upstream   │────────────────┼─▶ server
//!                      │              └──────────────┘                │
//!                      └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tokio::net::TcpListener;

use stability_proxy::config::{read_config, validate_config, ConfigError, ProxyConfig};
use stability_proxy::lifecycle::{signals, Shutdown};
use stability_proxy::observability::{logging, metrics};
use stability_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "stability-proxy")]
#[command(about = "Waits for the page to stabilize before forwarding WebDriver commands", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides listener.bind_address's port).
    #[arg(short, long)]
    port: Option<u16>,

    /// WebDriver server base URL.
    #[arg(long)]
    selenium_address: Option<String>,

    /// Start with stabilization turned off.
    #[arg(long)]
    disable_stabilization: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long)]
    log_filter: Option<String>,

    /// Enable the Prometheus endpoint on this address.
    #[arg(long)]
    metrics_address: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut ProxyConfig) {
        if let Some(port) = self.port {
            let ip = config
                .listener
                .bind_address
                .parse::<SocketAddr>()
                .map(|addr| addr.ip())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
            config.listener.bind_address = SocketAddr::new(ip, port).to_string();
        }
        if let Some(address) = &self.selenium_address {
            config.backend.selenium_address = address.clone();
        }
        if self.disable_stabilization {
            config.stabilization.enabled = false;
        }
        if let Some(filter) = &self.log_filter {
            config.observability.log_filter = filter.clone();
        }
        if let Some(address) = &self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = address.clone();
        }
    }
}

/// Defaults, then the config file, then flags; validated once at the end.
fn resolve_config(args: &Args) -> Result<ProxyConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };
    args.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    logging::init_tracing(&config.observability.log_filter)?;

    tracing::info!("stability-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        selenium_address = %config.backend.selenium_address,
        stabilization_enabled = config.stabilization.enabled,
        probe_timeout_secs = config.timeouts.probe_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            signals::wait_for_signal().await;
            shutdown.trigger();
        }
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
