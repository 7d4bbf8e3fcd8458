// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admission control for Gatehouse.
//!
//! This crate provides:
//! - **Threshold table**: capacity and trailing window per category, plus a
//!   per-actor global aggregate
//! - **Sliding windows**: ordered occurrence timestamps with lazy eviction
//! - **Admission limiter**: atomic check-and-record per actor, reports, resets,
//!   and a maintenance sweep that reclaims idle actors

pub mod limiter;
pub mod report;
pub mod thresholds;
pub mod window;

pub use limiter::{AdmissionLimiter, SweepReport};
pub use report::{ActorReport, CategoryReport, LimitReport};
pub use thresholds::{Limit, ThresholdTable};
