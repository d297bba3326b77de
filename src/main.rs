//! HostPulse - Host Reachability Monitor
//!
//! Probes every monitored host with the system ping command and writes a
//! normalized event per target to the event store. Scheduling cadence is left
//! to the caller (cron or the host platform); one invocation runs one batch.

mod config;
mod db;
mod probe;
mod sensor;

use config::ServerConfig;
use db::{Host, Store};

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("hostpulse=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting HostPulse batch run");
    tracing::info!("Using database at {}", cfg.db_path);

    // Initialize database
    let store = Arc::new(Store::new(&cfg.db_path)?);

    // Add sample host if none exist
    let hosts = store.get_hosts()?;
    if hosts.is_empty() {
        tracing::info!("Adding sample host: localhost");
        let mut host = Host {
            name: "localhost".to_string(),
            ip_addresses: vec!["127.0.0.1".to_string()],
            ..Default::default()
        };
        host.options.probe_count = cfg.probe_count;
        store.add_host(&mut host)?;
    }

    let host_ids: Vec<i64> = store.get_hosts()?.iter().map(|h| h.id).collect();

    // Run one coordinated batch and persist the events
    let report = sensor::run_batch(&store, &cfg, &host_ids).await?;
    store.add_events(&report.events)?;

    for failure in &report.failures {
        tracing::warn!("Host {} not probed: {}", failure.host_id, failure.reason);
    }

    tracing::info!(
        "Done: {} submitted, {} probed, {} emitted, {} suppressed, {} unresolved",
        host_ids.len(),
        report.probed(),
        report.events.len(),
        report.suppressed,
        report.failures.len()
    );

    Ok(())
}
