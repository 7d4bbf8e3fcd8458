// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capacity- and age-bounded turn log for one (actor, scope) pair.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use gatehouse_core::Role;
use tracing::debug;

use crate::types::{BucketStats, Turn};

/// Turns ordered by `recorded_at` ascending. Both eviction rules remove from
/// the head only.
#[derive(Debug, Clone, Default)]
pub struct Bucket {
    turns: VecDeque<Turn>,
}

impl Bucket {
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Turn> + ExactSizeIterator {
        self.turns.iter()
    }

    pub fn newest(&self) -> Option<DateTime<Utc>> {
        self.turns.back().map(|t| t.recorded_at)
    }

    /// Drops turns whose age has reached `retention`. Returns how many.
    pub fn purge_expired(&mut self, now: DateTime<Utc>, retention: Duration) -> usize {
        let retention = TimeDelta::from_std(retention).unwrap_or(TimeDelta::MAX);
        let Some(cutoff) = now.checked_sub_signed(retention) else {
            return 0;
        };
        let mut purged = 0;
        while self.turns.front().is_some_and(|t| t.recorded_at <= cutoff) {
            self.turns.pop_front();
            purged += 1;
        }
        purged
    }

    /// Appends at the tail, evicting from the head while over `capacity`.
    ///
    /// A timestamp earlier than the current tail is raised to the tail's so
    /// the ordering holds even if the clock steps backwards.
    pub fn push(&mut self, mut turn: Turn, capacity: usize) -> usize {
        if let Some(newest) = self.newest()
            && turn.recorded_at < newest
        {
            debug!(
                recorded_at = %turn.recorded_at,
                newest = %newest,
                "turn timestamp behind bucket tail, clamping"
            );
            turn.recorded_at = newest;
        }
        self.turns.push_back(turn);
        self.truncate_front(capacity)
    }

    /// Keeps only the newest `capacity` turns. Returns how many were dropped.
    pub fn truncate_front(&mut self, capacity: usize) -> usize {
        let excess = self.turns.len().saturating_sub(capacity);
        self.turns.drain(..excess);
        excess
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn stats(&self) -> BucketStats {
        let user_turns = self.turns.iter().filter(|t| t.role == Role::User).count();
        BucketStats {
            total_turns: self.turns.len(),
            user_turns,
            assistant_turns: self.turns.len() - user_turns,
            oldest: self.turns.front().map(|t| t.recorded_at),
            newest: self.newest(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn turn(secs: i64, content: &str) -> Turn {
        Turn {
            role: Role::User,
            content: content.to_string(),
            recorded_at: at(secs),
        }
    }

    #[test]
    fn purge_removes_turns_at_exact_retention_age() {
        let mut bucket = Bucket::default();
        bucket.push(turn(0, "a"), 10);
        bucket.push(turn(1, "b"), 10);
        assert_eq!(bucket.purge_expired(at(99), Duration::from_secs(100)), 0);
        assert_eq!(bucket.purge_expired(at(100), Duration::from_secs(100)), 1);
        assert_eq!(bucket.iter().next().unwrap().content, "b");
    }

    #[test]
    fn push_clamps_backwards_timestamps() {
        let mut bucket = Bucket::default();
        bucket.push(turn(10, "a"), 10);
        bucket.push(turn(5, "b"), 10);
        assert_eq!(bucket.newest(), Some(at(10)));
    }

    #[test]
    fn stats_counts_roles() {
        let mut bucket = Bucket::default();
        bucket.push(turn(0, "q"), 10);
        bucket.push(
            Turn {
                role: Role::Assistant,
                content: "a".into(),
                recorded_at: at(1),
            },
            10,
        );
        let stats = bucket.stats();
        assert_eq!(stats.total_turns, 2);
        assert_eq!(stats.user_turns, 1);
        assert_eq!(stats.assistant_turns, 1);
        assert_eq!(stats.oldest, Some(at(0)));
        assert_eq!(stats.newest, Some(at(1)));
    }

    proptest! {
        #[test]
        fn capacity_and_order_hold_after_any_push_sequence(
            offsets in proptest::collection::vec(-5i64..30, 1..80),
            capacity in 1usize..25,
        ) {
            let mut bucket = Bucket::default();
            let mut t = 0;
            for (i, offset) in offsets.iter().enumerate() {
                t += offset;
                bucket.push(turn(t, &i.to_string()), capacity);
                prop_assert!(bucket.len() <= capacity);
                let times: Vec<_> = bucket.iter().map(|t| t.recorded_at).collect();
                prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
            }
            // The survivors are exactly the last pushes.
            let expected: Vec<String> = (0..offsets.len())
                .skip(offsets.len().saturating_sub(capacity))
                .map(|i| i.to_string())
                .collect();
            let actual: Vec<String> = bucket.iter().map(|t| t.content.clone()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
