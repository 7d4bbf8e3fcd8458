// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation memory for Gatehouse.
//!
//! Keeps, per actor and conversation scope, the most recent turns bounded
//! both by count and by age, and serves a suffix of them as context for the
//! next generation request.

pub mod backup;
pub mod bucket;
pub mod store;
pub mod types;

pub use backup::ImportReport;
pub use store::{ContextStore, StoreSweepReport};
pub use types::{BucketStats, ExportedTurn, ImportEntry, StoreStats, Turn};
