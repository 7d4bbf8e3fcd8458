// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus exporter for Gatehouse.
//!
//! The limiter, store, and agent crates emit through the metrics-rs facade.
//! This crate installs the global recorder and, in `serve` mode, the HTTP
//! scrape listener.

pub mod recording;

use std::net::SocketAddr;

use gatehouse_core::GatehouseError;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{error, info};

pub use recording::register_metrics;

/// Handle to the installed Prometheus recorder.
pub struct PrometheusExporter {
    handle: PrometheusHandle,
}

impl PrometheusExporter {
    /// Installs the recorder globally and serves `/metrics` on `listen`.
    ///
    /// Must be called from within a tokio runtime. Only one recorder can be
    /// installed per process.
    pub fn install(listen: SocketAddr) -> Result<Self, GatehouseError> {
        let (recorder, exporter) = PrometheusBuilder::new()
            .with_http_listener(listen)
            .build()
            .map_err(|e| GatehouseError::Internal(format!("failed to build Prometheus exporter: {e}")))?;
        let handle = recorder.handle();
        metrics::set_global_recorder(recorder)
            .map_err(|e| GatehouseError::Internal(format!("failed to install metrics recorder: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = exporter.await {
                error!(error = ?e, "prometheus listener stopped");
            }
        });

        register_metrics();
        info!(%listen, "prometheus exporter listening");
        Ok(Self { handle })
    }

    /// Installs the recorder without a listener; metrics are read via [`render`](Self::render).
    pub fn recorder_only() -> Result<Self, GatehouseError> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| GatehouseError::Internal(format!("failed to install metrics recorder: {e}")))?;
        register_metrics();
        info!("prometheus recorder installed");
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Current metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
