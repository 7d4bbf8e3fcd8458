// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-side wiring of the admission limiter and the context store.
//!
//! - [`Gatehouse`] runs one request through admit → read context → generate →
//!   record both turns
//! - [`maintenance::run_maintenance`] sweeps both components on an interval
//! - [`shutdown::install_signal_handler`] turns SIGINT/SIGTERM into a
//!   cancellation token for the maintenance loop

pub mod backpressure;
pub mod conversation;
pub mod maintenance;
pub mod shutdown;

pub use backpressure::throttle_message;
pub use conversation::{Gatehouse, Outcome};
pub use maintenance::{run_maintenance, sweep_once, MaintenanceReport};
