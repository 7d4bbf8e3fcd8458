// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manually driven clock.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use gatehouse_core::Clock;

/// A clock that only moves when told to.
///
/// Starts at 2026-01-01T00:00:00Z. Share it through an `Arc` so the test
/// keeps a handle after passing it to a limiter or store.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Epoch seconds of the default start instant.
    const START: i64 = 1_767_225_600;

    pub fn new() -> Self {
        Self::starting_at(DateTime::from_timestamp(Self::START, 0).unwrap_or_default())
    }

    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.lock() = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += TimeDelta::from_std(by).expect("advance out of range");
    }

    /// Moves the clock backwards, simulating a wall-clock regression.
    pub fn rewind(&self, by: Duration) {
        let mut now = self.lock();
        *now -= TimeDelta::from_std(by).expect("rewind out of range");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_and_rewind_move_now() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.advance(Duration::from_secs(90));
        assert_eq!((clock.now() - start).num_seconds(), 90);
        clock.rewind(Duration::from_secs(30));
        assert_eq!((clock.now() - start).num_seconds(), 60);
    }
}
