// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn records and report types for the context store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use gatehouse_core::{ContextMessage, Role};
use serde::{Deserialize, Serialize};

/// One recorded message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub recorded_at: DateTime<Utc>,
}

impl Turn {
    /// Strips the timestamp for handing to a generator.
    pub fn to_context(&self) -> ContextMessage {
        ContextMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// A turn as serialized for backup and inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedTurn {
    pub role: Role,
    pub content: String,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}

impl From<&Turn> for ExportedTurn {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
            recorded_at: turn.recorded_at,
        }
    }
}

/// An entry to restore. Without a timestamp it is stamped with the current time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub role: Role,
    pub content: String,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl From<ExportedTurn> for ImportEntry {
    fn from(turn: ExportedTurn) -> Self {
        Self {
            role: turn.role,
            content: turn.content,
            recorded_at: Some(turn.recorded_at),
        }
    }
}

/// Summary of one (actor, scope) bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BucketStats {
    pub total_turns: usize,
    pub user_turns: usize,
    pub assistant_turns: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

/// Store-wide totals, for observability only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub actors: usize,
    pub scopes: usize,
    pub turns: usize,
    pub max_turns: usize,
    pub retention: Duration,
}
