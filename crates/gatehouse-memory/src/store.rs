// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-actor, per-scope conversation context store.
//!
//! Buckets are created on first append and bounded by `max_turns` (oldest
//! evicted on write) and by `retention` (purged on every access). Reads of
//! an unknown actor or scope return empty results without creating state.
//!
//! An `append` racing a `context` read for the same bucket may or may not be
//! observed by that read. Callers fetch context before generating and
//! append both turns afterwards.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use gatehouse_config::model::MemoryConfig;
use gatehouse_core::{ActorId, Clock, ContextMessage, Role, ScopeId};
use tracing::debug;

use crate::backup::ImportReport;
use crate::bucket::Bucket;
use crate::types::{BucketStats, ExportedTurn, ImportEntry, StoreStats, Turn};

type Scopes = HashMap<ScopeId, Bucket>;

/// Outcome of a maintenance sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSweepReport {
    pub turns_purged: usize,
    pub buckets_removed: usize,
    pub actors_removed: usize,
}

/// In-memory conversation store shared across request handlers.
pub struct ContextStore {
    max_turns: usize,
    retention: Duration,
    clock: Arc<dyn Clock>,
    actors: DashMap<ActorId, Scopes>,
}

impl ContextStore {
    pub fn new(max_turns: usize, retention: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_turns,
            retention,
            clock,
            actors: DashMap::new(),
        }
    }

    /// Creates a store from the `[memory]` configuration section.
    pub fn from_config(config: &MemoryConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.max_turns, config.retention(), clock)
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Records a new turn stamped with the current time.
    pub fn append(&self, actor: &ActorId, scope: &ScopeId, role: Role, content: impl Into<String>) {
        let now = self.clock.now();
        let mut scopes = self.actors.entry(actor.clone()).or_default();
        let bucket = scopes.entry(scope.clone()).or_default();

        bucket.purge_expired(now, self.retention);
        let evicted = bucket.push(
            Turn {
                role,
                content: content.into(),
                recorded_at: now,
            },
            self.max_turns,
        );

        metrics::counter!("gatehouse_turns_appended_total", "role" => role.to_string())
            .increment(1);
        if evicted > 0 {
            debug!(actor = %actor, scope = %scope, evicted, "bucket at capacity, evicted oldest");
        }
    }

    /// Up to `max_turns` most recent surviving turns, oldest first.
    pub fn context(&self, actor: &ActorId, scope: &ScopeId, max_turns: usize) -> Vec<ContextMessage> {
        self.with_bucket(actor, scope, |bucket| {
            let skip = bucket.len().saturating_sub(max_turns);
            bucket.iter().skip(skip).map(Turn::to_context).collect()
        })
        .unwrap_or_default()
    }

    /// Empties one scope, or every scope of the actor.
    pub fn clear(&self, actor: &ActorId, scope: Option<&ScopeId>) {
        match scope {
            Some(scope) => {
                if let Some(mut scopes) = self.actors.get_mut(actor) {
                    scopes.remove(scope);
                }
                // Drop the actor once its last scope is gone.
                self.actors.remove_if(actor, |_, scopes| scopes.is_empty());
            }
            None => {
                self.actors.remove(actor);
            }
        }
        debug!(actor = %actor, scope = ?scope, "conversation memory cleared");
    }

    /// Full bucket contents after the expiry purge, oldest first.
    pub fn export(&self, actor: &ActorId, scope: &ScopeId) -> Vec<ExportedTurn> {
        self.with_bucket(actor, scope, |bucket| bucket.iter().map(ExportedTurn::from).collect())
            .unwrap_or_default()
    }

    /// Replaces the bucket with `entries`.
    ///
    /// Entries are ordered by timestamp (stable, so equal timestamps keep
    /// their given order); timestamps in the future are clamped to now; then
    /// the same retention and capacity bounds as `append` apply.
    pub fn import(
        &self,
        actor: &ActorId,
        scope: &ScopeId,
        entries: impl IntoIterator<Item = ImportEntry>,
    ) -> ImportReport {
        let now = self.clock.now();
        let mut turns: Vec<Turn> = entries
            .into_iter()
            .map(|entry| Turn {
                role: entry.role,
                content: entry.content,
                recorded_at: entry.recorded_at.map_or(now, |ts| ts.min(now)),
            })
            .collect();
        turns.sort_by_key(|t| t.recorded_at);

        let mut report = ImportReport {
            imported: turns.len(),
            ..ImportReport::default()
        };

        let mut bucket = Bucket::default();
        for turn in turns {
            report.dropped_over_capacity += bucket.push(turn, self.max_turns);
        }
        report.dropped_expired = bucket.purge_expired(now, self.retention);
        report.imported -= report.dropped_over_capacity + report.dropped_expired;

        let mut scopes = self.actors.entry(actor.clone()).or_default();
        if bucket.is_empty() {
            scopes.remove(scope);
        } else {
            scopes.insert(scope.clone(), bucket);
        }
        drop(scopes);
        self.actors.remove_if(actor, |_, scopes| scopes.is_empty());

        debug!(
            actor = %actor,
            scope = %scope,
            imported = report.imported,
            dropped_over_capacity = report.dropped_over_capacity,
            dropped_expired = report.dropped_expired,
            "conversation imported"
        );
        report
    }

    /// Turn counts by role and the oldest/newest timestamps for one bucket.
    pub fn stats(&self, actor: &ActorId, scope: &ScopeId) -> BucketStats {
        self.with_bucket(actor, scope, |bucket| bucket.stats())
            .unwrap_or_default()
    }

    /// Store-wide totals.
    pub fn global_stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            actors: 0,
            scopes: 0,
            turns: 0,
            max_turns: self.max_turns,
            retention: self.retention,
        };
        for entry in self.actors.iter() {
            stats.actors += 1;
            stats.scopes += entry.value().len();
            stats.turns += entry.value().values().map(Bucket::len).sum::<usize>();
        }
        stats
    }

    /// Purges expired turns everywhere and drops empty buckets and actors.
    pub fn sweep(&self) -> StoreSweepReport {
        let now = self.clock.now();
        let mut report = StoreSweepReport::default();

        self.actors.retain(|_, scopes| {
            scopes.retain(|_, bucket| {
                report.turns_purged += bucket.purge_expired(now, self.retention);
                let keep = !bucket.is_empty();
                if !keep {
                    report.buckets_removed += 1;
                }
                keep
            });
            let keep = !scopes.is_empty();
            if !keep {
                report.actors_removed += 1;
            }
            keep
        });

        let totals = self.global_stats();
        metrics::gauge!("gatehouse_tracked_actors", "component" => "memory")
            .set(totals.actors as f64);
        metrics::gauge!("gatehouse_stored_turns").set(totals.turns as f64);
        debug!(
            purged = report.turns_purged,
            buckets_removed = report.buckets_removed,
            actors_removed = report.actors_removed,
            "memory sweep complete"
        );
        report
    }

    /// Runs `f` on the purged bucket, or returns `None` if it does not exist.
    fn with_bucket<T>(
        &self,
        actor: &ActorId,
        scope: &ScopeId,
        f: impl FnOnce(&Bucket) -> T,
    ) -> Option<T> {
        let now: DateTime<Utc> = self.clock.now();
        let mut scopes = self.actors.get_mut(actor)?;
        let bucket = scopes.get_mut(scope)?;
        bucket.purge_expired(now, self.retention);
        Some(f(bucket))
    }
}
