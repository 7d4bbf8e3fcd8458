// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal handling for the long-running `serve` mode.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Installs handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] cancelled when either signal arrives.
/// If the SIGTERM handler cannot be installed, only Ctrl+C is watched.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let ctrl_c = interrupt(tokio::signal::ctrl_c());

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT, shutting down"),
                        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                    }
                }
                Err(e) => {
                    error!(error = %e, "failed to install SIGTERM handler");
                    ctrl_c.await;
                    info!("received SIGINT, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await;
            info!("received Ctrl+C, shutting down");
        }

        trigger.cancel();
        debug!("signal handler finished");
    });

    token
}

/// Resolves when `listener` reports an interrupt. A listener that fails
/// never resolves, so only a real signal cancels.
async fn interrupt(listener: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = listener.await {
        error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn token_starts_uncancelled() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }

    #[tokio::test]
    async fn received_interrupt_resolves() {
        interrupt(async { Ok(()) }).await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_listener_never_resolves() {
        let failed = interrupt(async { Err(std::io::Error::other("no signal driver")) });
        let waited = tokio::time::timeout(Duration::from_secs(3600), failed).await;
        assert!(waited.is_err());
    }
}
