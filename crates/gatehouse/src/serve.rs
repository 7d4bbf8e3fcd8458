// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gatehouse serve` command implementation.
//!
//! Builds the limiter and store, starts the Prometheus listener when enabled,
//! and sweeps both on the configured interval until a shutdown signal.

use std::net::SocketAddr;
use std::sync::Arc;

use gatehouse_agent::shutdown::install_signal_handler;
use gatehouse_agent::{Gatehouse, run_maintenance};
use gatehouse_config::GatehouseConfig;
use gatehouse_core::{GatehouseError, SystemClock};
use gatehouse_prometheus::PrometheusExporter;
use tracing::{info, warn};

pub async fn run_serve(config: GatehouseConfig) -> Result<(), GatehouseError> {
    init_tracing(&config.general.log_level);

    let _exporter = if config.metrics.enabled {
        let listen: SocketAddr = config.metrics.listen_address.parse().map_err(|e| {
            GatehouseError::Config(format!(
                "invalid metrics.listen_address '{}': {e}",
                config.metrics.listen_address
            ))
        })?;
        Some(PrometheusExporter::install(listen)?)
    } else {
        info!("metrics exporter disabled by configuration");
        None
    };

    let gatehouse = Gatehouse::from_config(&config, Arc::new(SystemClock));
    let cancel = install_signal_handler();

    let maintenance = tokio::spawn(run_maintenance(
        gatehouse.limiter().clone(),
        gatehouse.store().clone(),
        config.maintenance.interval(),
        cancel.clone(),
    ));

    info!(
        global_capacity = config.limiter.global.capacity,
        failure_policy = ?config.limiter.failure_policy,
        memory_enabled = config.memory.enabled,
        "gatehouse serving"
    );

    cancel.cancelled().await;

    match maintenance.await {
        Ok(sweeps) => info!(sweeps, "gatehouse stopped"),
        Err(e) => warn!(error = %e, "maintenance task did not shut down cleanly"),
    }
    Ok(())
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gatehouse={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
