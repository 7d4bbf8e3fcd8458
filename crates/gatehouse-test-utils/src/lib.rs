// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Gatehouse tests.
//!
//! Provides deterministic stand-ins for the two external capabilities so
//! limiter, store, and conversation tests run without wall-clock time or a
//! real text generation service.
//!
//! # Components
//!
//! - [`ManualClock`] - Settable clock shared between a test and the code under test
//! - [`MockGenerator`] - Generator with scripted replies and failures

pub mod clock;
pub mod mock_generator;

pub use clock::ManualClock;
pub use mock_generator::MockGenerator;
