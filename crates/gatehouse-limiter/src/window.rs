// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered occurrence log for one (actor, category) pair.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use gatehouse_core::GatehouseError;

/// Timestamps of admitted occurrences, oldest at the head.
///
/// Entries are appended at the tail in non-decreasing order. An entry is
/// expired once it is strictly older than the window.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindow {
    entries: VecDeque<DateTime<Utc>>,
}

/// Earliest timestamp still inside `window` at `now`.
fn cutoff(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl SlidingWindow {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.entries.front().copied()
    }

    pub fn newest(&self) -> Option<DateTime<Utc>> {
        self.entries.back().copied()
    }

    /// Drops expired entries from the head. Returns how many were dropped.
    pub fn evict_expired(&mut self, now: DateTime<Utc>, window: Duration) -> usize {
        let cutoff = cutoff(now, window);
        let mut evicted = 0;
        while self.entries.front().is_some_and(|ts| *ts < cutoff) {
            self.entries.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Fails when the head is newer than the tail. `record` only ever
    /// appends non-decreasing timestamps, so this means the log is corrupt.
    pub fn check_order(&self) -> Result<(), GatehouseError> {
        match (self.oldest(), self.newest()) {
            (Some(oldest), Some(newest)) if oldest > newest => {
                Err(GatehouseError::InvariantViolation(format!(
                    "oldest occurrence {oldest} is after newest {newest}"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Appends an occurrence at `at`, raised to the current tail if earlier.
    pub fn record(&mut self, at: DateTime<Utc>) {
        let at = self.newest().map_or(at, |newest| newest.max(at));
        self.entries.push_back(at);
    }

    /// Appends without the ordering guarantee of [`record`](Self::record).
    #[cfg(test)]
    pub(crate) fn push_unordered(&mut self, at: DateTime<Utc>) {
        self.entries.push_back(at);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries inside the window, without mutating.
    pub fn count_within(&self, now: DateTime<Utc>, window: Duration) -> usize {
        let cutoff = cutoff(now, window);
        self.entries.iter().filter(|ts| **ts >= cutoff).count()
    }

    /// Time until the oldest counted entry leaves the window, or zero when
    /// fewer than `capacity` entries are counted.
    pub fn time_until_reset(
        &self,
        now: DateTime<Utc>,
        window: Duration,
        capacity: usize,
    ) -> Duration {
        if self.count_within(now, window) < capacity {
            return Duration::ZERO;
        }
        let cutoff = cutoff(now, window);
        let Some(oldest) = self.entries.iter().find(|ts| **ts >= cutoff) else {
            return Duration::ZERO;
        };
        let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        let Some(expires) = oldest.checked_add_signed(window) else {
            return Duration::MAX;
        };
        (expires - now).to_std().unwrap_or(Duration::ZERO)
    }
}
