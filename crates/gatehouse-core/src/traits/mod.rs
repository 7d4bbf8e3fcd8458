// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capabilities supplied by the embedding application.

pub mod clock;
pub mod generator;

pub use clock::{Clock, SystemClock};
pub use generator::Generator;
