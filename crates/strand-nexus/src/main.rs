//! Strand/Nexus operator binary.
//!
//! Wires the in-memory state store, the health and firmware fleet
//! reconcilers, the MIC certificate authority, and the L5 server dispatch
//! loop together behind one overlay transport. This is the minimal
//! operator entry point needed to exercise the core (spec.md §1: CLIs and
//! dashboards beyond this are out of scope).
//!
//! # Usage
//!
//! ```bash
//! strand-nexus --bind 0.0.0.0:6477
//! ```

mod config;
mod handler;

use std::sync::Arc;

use clap::Parser;
use config::NexusConfig;
use handler::ResolvingHandler;
use strand_ca::CertificateAuthority;
use strand_fleet::{EventLog, FirmwareReconciler, HealthReconciler};
use strand_routing::RoutingTable;
use strand_server::Server;
use strand_store::InMemoryStore;
use strand_transport::Transport;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Strand/Nexus operator binary: L5 server, L2 resolver, and fleet control
/// plane over one overlay transport.
#[derive(Parser, Debug)]
#[command(name = "strand-nexus")]
#[command(about = "Strand/Nexus fleet node: L5 dispatch, L2 resolver, fleet control plane")]
#[command(version)]
struct Args {
    /// Overlay transport bind address.
    #[arg(short, long, default_value_t = format!("0.0.0.0:{}", strand_transport::OVERLAY_PORT))]
    bind: String,

    /// Desired firmware version the fleet should converge on.
    #[arg(long)]
    desired_firmware: Option<String>,

    /// Health reconciler tick interval, in seconds.
    #[arg(long, default_value_t = strand_fleet::DEFAULT_CHECK_INTERVAL.as_secs())]
    health_check_interval_secs: u64,

    /// Firmware reconciler tick interval, in seconds.
    #[arg(long, default_value_t = strand_fleet::DEFAULT_RECONCILE_INTERVAL.as_secs())]
    firmware_reconcile_interval_secs: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = NexusConfig {
        bind_address: args.bind,
        health_check_interval: std::time::Duration::from_secs(args.health_check_interval_secs),
        firmware_reconcile_interval: std::time::Duration::from_secs(
            args.firmware_reconcile_interval_secs,
        ),
        desired_firmware_version: args.desired_firmware,
        ..NexusConfig::default()
    };

    tracing::info!(bind = %config.bind_address, "strand-nexus starting");

    let store = Arc::new(InMemoryStore::new());
    let events = Arc::new(EventLog::new());

    let mut ca = CertificateAuthority::new();
    ca.generate_ca();
    let ca = Arc::new(ca);
    if let Some(key) = ca.public_key() {
        tracing::info!(root_key = %hex_encode(key.as_bytes()), "MIC certificate authority root keypair generated");
    }

    let table = Arc::new(RoutingTable::new());

    let health_reconciler = Arc::new(HealthReconciler::with_unhealthy_after(
        Arc::clone(&store),
        Arc::clone(&events),
        config.unhealthy_after,
    ));
    let firmware_reconciler = Arc::new(FirmwareReconciler::new(Arc::clone(&store), Arc::clone(&events)));
    if let Some(version) = config.desired_firmware_version.clone() {
        firmware_reconciler.set_desired_version(Some(version));
    }

    let reconciler_ctx = CancellationToken::new();
    let health_task = {
        let reconciler = Arc::clone(&health_reconciler);
        let ctx = reconciler_ctx.clone();
        let interval = config.health_check_interval;
        tokio::spawn(async move { reconciler.run(ctx, interval).await })
    };
    let firmware_task = {
        let reconciler = Arc::clone(&firmware_reconciler);
        let ctx = reconciler_ctx.clone();
        let interval = config.firmware_reconcile_interval;
        tokio::spawn(async move { reconciler.run(ctx, interval).await })
    };

    let transport = Arc::new(Transport::bind(config.bind_address.parse()?).await?);

    let handler = Arc::new(ResolvingHandler::new(Arc::clone(&table)));
    let server = Server::new(transport, handler);

    let server_ctx = CancellationToken::new();
    let shutdown_ctx = server_ctx.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
        shutdown_ctx.cancel();
    });

    server.run(server_ctx).await?;

    reconciler_ctx.cancel();
    let _ = health_task.await;
    let _ = firmware_task.await;

    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
