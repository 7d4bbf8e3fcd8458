// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Gatehouse.

use thiserror::Error;

/// The primary error type used across Gatehouse crates.
///
/// The limiter and store operations never surface this to callers; it is
/// used internally at operation boundaries and by the I/O-facing helpers
/// (configuration, JSON backup/restore, the conversation flow).
#[derive(Debug, Error)]
pub enum GatehouseError {
    /// Configuration errors (invalid TOML, out-of-range thresholds).
    #[error("configuration error: {0}")]
    Config(String),

    /// Backup payload could not be parsed or produced.
    #[error("serialization error: {source}")]
    Serialization {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The text generator failed. Reported to the caller as-is.
    #[error("generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// Per-actor state was found in a shape the algorithms never produce.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for GatehouseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            source: Box::new(err),
        }
    }
}

/// Failures reported by a [`Generator`](crate::traits::Generator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// The provider refused the call because a usage quota is exhausted.
    #[error("provider quota exceeded")]
    QuotaExceeded,

    /// The provider rejected the configured credentials.
    #[error("provider authentication failed")]
    Authentication,

    /// Any other provider-side failure.
    #[error("provider failure: {message}")]
    Provider { message: String },
}
