// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic eviction of idle limiter windows and expired context.

use std::sync::Arc;
use std::time::Duration;

use gatehouse_limiter::{AdmissionLimiter, SweepReport};
use gatehouse_memory::{ContextStore, StoreSweepReport};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Combined result of one limiter sweep and one store sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub limiter: SweepReport,
    pub store: StoreSweepReport,
}

/// Sweeps both components once.
pub fn sweep_once(limiter: &AdmissionLimiter, store: &ContextStore) -> MaintenanceReport {
    let report = MaintenanceReport {
        limiter: limiter.sweep(),
        store: store.sweep(),
    };
    debug!(
        occurrences_evicted = report.limiter.occurrences_evicted,
        limiter_actors_removed = report.limiter.actors_removed,
        turns_purged = report.store.turns_purged,
        store_actors_removed = report.store.actors_removed,
        "maintenance sweep"
    );
    report
}

/// Sweeps on every `interval` tick until `cancel` fires.
///
/// The first tick completes immediately. Returns the number of sweeps run.
pub async fn run_maintenance(
    limiter: Arc<AdmissionLimiter>,
    store: Arc<ContextStore>,
    interval: Duration,
    cancel: CancellationToken,
) -> u64 {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut sweeps = 0u64;

    info!(interval_secs = interval.as_secs(), "maintenance task started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!(sweeps, "maintenance task stopped");
                return sweeps;
            }
            _ = ticker.tick() => {
                sweep_once(&limiter, &store);
                sweeps += 1;
            }
        }
    }
}
