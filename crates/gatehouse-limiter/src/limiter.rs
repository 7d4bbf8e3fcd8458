// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-actor sliding-window admission limiter.
//!
//! Each actor owns a global window and one window per configured category.
//! `allow` evicts, checks, and records while holding the actor's map entry,
//! so two concurrent callers for the same actor can never both take the last
//! slot. Eviction is lazy; [`AdmissionLimiter::sweep`] exists only to reclaim
//! actors that stopped making requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use gatehouse_config::model::{FailurePolicy, LimiterConfig};
use gatehouse_core::{ActorId, Category, Clock, GatehouseError};
use tracing::{debug, error, warn};

use crate::report::{ActorReport, CategoryReport, LimitReport};
use crate::thresholds::{Limit, ThresholdTable};
use crate::window::SlidingWindow;

#[derive(Debug, Default)]
struct ActorWindows {
    global: SlidingWindow,
    categories: HashMap<Category, SlidingWindow>,
}

impl ActorWindows {
    fn is_empty(&self) -> bool {
        self.global.is_empty() && self.categories.values().all(SlidingWindow::is_empty)
    }

    /// Latest occurrence recorded in any window.
    fn newest(&self) -> Option<DateTime<Utc>> {
        self.categories
            .values()
            .filter_map(SlidingWindow::newest)
            .chain(self.global.newest())
            .max()
    }
}

/// Which limit turned a request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Admitted,
    DeniedGlobal,
    DeniedCategory,
}

/// Outcome of a maintenance sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub occurrences_evicted: usize,
    pub actors_removed: usize,
    pub actors_remaining: usize,
}

/// Sliding-window admission limiter keyed by actor.
pub struct AdmissionLimiter {
    thresholds: ThresholdTable,
    policy: FailurePolicy,
    clock: Arc<dyn Clock>,
    actors: DashMap<ActorId, ActorWindows>,
}

impl AdmissionLimiter {
    pub fn new(thresholds: ThresholdTable, policy: FailurePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            thresholds,
            policy,
            clock,
            actors: DashMap::new(),
        }
    }

    /// Creates a limiter from the `[limiter]` configuration section.
    pub fn from_config(config: &LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(ThresholdTable::from(config), config.failure_policy, clock)
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Admits or denies one operation, recording it against the category and
    /// global windows only when admitted.
    ///
    /// Never fails: a corrupted per-actor record is logged and resolved by the
    /// configured [`FailurePolicy`].
    pub fn allow(&self, actor: &ActorId, category: Category) -> bool {
        let now = self.clock.now();
        let admitted = match self.check_and_record(actor, category, now) {
            Ok(Verdict::Admitted) => true,
            Ok(Verdict::DeniedGlobal) => {
                warn!(actor = %actor, category = %category, "actor hit global rate limit");
                false
            }
            Ok(Verdict::DeniedCategory) => {
                warn!(actor = %actor, category = %category, "actor hit category rate limit");
                false
            }
            Err(e) => {
                metrics::counter!("gatehouse_limiter_faults_total").increment(1);
                let admit = self.policy == FailurePolicy::Open;
                error!(
                    actor = %actor,
                    category = %category,
                    error = %e,
                    admitted = admit,
                    "rate limit evaluation failed, applying failure policy"
                );
                admit
            }
        };

        metrics::counter!(
            "gatehouse_admissions_total",
            "category" => category.to_string(),
            "outcome" => if admitted { "admitted" } else { "denied" }
        )
        .increment(1);

        admitted
    }

    fn check_and_record(
        &self,
        actor: &ActorId,
        category: Category,
        now: DateTime<Utc>,
    ) -> Result<Verdict, GatehouseError> {
        // The entry guard serializes every caller for this actor until it drops.
        let mut entry = self.actors.entry(actor.clone()).or_default();
        let windows = entry.value_mut();

        // After the wall clock steps backwards, evaluate at the newest recorded
        // occurrence so earlier admissions keep counting.
        let at = match windows.newest() {
            Some(newest) if newest > now => {
                debug!(
                    actor = %actor,
                    behind_ms = (newest - now).num_milliseconds(),
                    "clock behind newest occurrence"
                );
                newest
            }
            _ => now,
        };

        let global = self.thresholds.global();
        windows.global.check_order()?;
        windows.global.evict_expired(at, global.window);
        if windows.global.len() >= global.capacity {
            return Ok(Verdict::DeniedGlobal);
        }

        let category_limit = self.thresholds.category(category);
        if let Some(limit) = category_limit {
            let window = windows.categories.entry(category).or_default();
            window.check_order()?;
            window.evict_expired(at, limit.window);
            if window.len() >= limit.capacity {
                return Ok(Verdict::DeniedCategory);
            }
            window.record(at);
        }

        windows.global.record(at);
        Ok(Verdict::Admitted)
    }

    /// Time until the oldest counted occurrence leaves its window when the
    /// actor is at or over capacity for `category` (or the global limit when
    /// `None`); zero otherwise. Unconfigured categories always report zero.
    pub fn time_until_reset(&self, actor: &ActorId, category: Option<Category>) -> Duration {
        let now = self.clock.now();
        let Some(windows) = self.actors.get(actor) else {
            return Duration::ZERO;
        };
        match category {
            None => reset_delay(&windows.global, self.thresholds.global(), now),
            Some(category) => match (
                self.thresholds.category(category),
                windows.categories.get(&category),
            ) {
                (Some(limit), Some(window)) => reset_delay(window, limit, now),
                _ => Duration::ZERO,
            },
        }
    }

    /// How long a caller denied for `category` should wait: the longer of
    /// the category delay and the global delay.
    pub fn retry_after(&self, actor: &ActorId, category: Category) -> Duration {
        self.time_until_reset(actor, Some(category))
            .max(self.time_until_reset(actor, None))
    }

    /// Usage report for the global limit and every configured category.
    pub fn stats(&self, actor: &ActorId) -> ActorReport {
        let now = self.clock.now();
        let windows = self.actors.get(actor);
        let empty = SlidingWindow::default();

        let global_window = windows.as_ref().map_or(&empty, |w| &w.global);
        let global = limit_report(global_window, self.thresholds.global(), now);

        let categories = self
            .thresholds
            .configured()
            .map(|(category, limit)| {
                let window = windows
                    .as_ref()
                    .and_then(|w| w.categories.get(&category))
                    .unwrap_or(&empty);
                CategoryReport {
                    category,
                    limit: limit_report(window, limit, now),
                }
            })
            .collect();

        ActorReport { global, categories }
    }

    /// Clears one category, or everything including the global window.
    pub fn reset(&self, actor: &ActorId, category: Option<Category>) {
        match category {
            Some(category) => {
                if let Some(mut windows) = self.actors.get_mut(actor)
                    && let Some(window) = windows.categories.get_mut(&category)
                {
                    window.clear();
                }
            }
            None => {
                self.actors.remove(actor);
            }
        }
        debug!(actor = %actor, category = ?category, "rate limits reset");
    }

    /// Evicts expired occurrences for every tracked actor and forgets actors
    /// left with none.
    pub fn sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let global = self.thresholds.global();
        let mut report = SweepReport::default();

        self.actors.retain(|_, windows| {
            report.occurrences_evicted += windows.global.evict_expired(now, global.window);
            windows.categories.retain(|category, window| {
                // Windows of categories no longer configured count as expired.
                let evicted = match self.thresholds.category(*category) {
                    Some(limit) => window.evict_expired(now, limit.window),
                    None => {
                        let n = window.len();
                        window.clear();
                        n
                    }
                };
                report.occurrences_evicted += evicted;
                !window.is_empty()
            });

            let keep = !windows.is_empty();
            if !keep {
                report.actors_removed += 1;
            }
            keep
        });

        report.actors_remaining = self.actors.len();
        metrics::gauge!("gatehouse_tracked_actors", "component" => "limiter")
            .set(report.actors_remaining as f64);
        debug!(
            evicted = report.occurrences_evicted,
            removed = report.actors_removed,
            remaining = report.actors_remaining,
            "limiter sweep complete"
        );
        report
    }

    /// Number of actors currently holding any state.
    pub fn tracked_actors(&self) -> usize {
        self.actors.len()
    }
}

fn reset_delay(window: &SlidingWindow, limit: Limit, now: DateTime<Utc>) -> Duration {
    window.time_until_reset(now, limit.window, limit.capacity)
}

fn limit_report(window: &SlidingWindow, limit: Limit, now: DateTime<Utc>) -> LimitReport {
    LimitReport {
        used: window.count_within(now, limit.window),
        capacity: limit.capacity,
        window: limit.window,
        time_until_reset: reset_delay(window, limit, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_test_utils::ManualClock;

    const MINUTE: Duration = Duration::from_secs(60);

    fn limiter_with(
        table: ThresholdTable,
        policy: FailurePolicy,
    ) -> (AdmissionLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let limiter = AdmissionLimiter::new(table, policy, clock.clone());
        (limiter, clock)
    }

    fn chat_only(capacity: usize) -> ThresholdTable {
        ThresholdTable::new(Limit::new(100, MINUTE))
            .with_category(Category::Chat, Limit::new(capacity, MINUTE))
    }

    #[test]
    fn denied_call_records_nothing() {
        let (limiter, _clock) = limiter_with(chat_only(1), FailurePolicy::Open);
        let actor = ActorId::from("a");
        assert!(limiter.allow(&actor, Category::Chat));
        assert!(!limiter.allow(&actor, Category::Chat));
        let stats = limiter.stats(&actor);
        assert_eq!(stats.global.used, 1);
        assert_eq!(stats.category(Category::Chat).unwrap().used, 1);
    }

    #[test]
    fn global_denial_does_not_touch_category_window() {
        let table = ThresholdTable::new(Limit::new(1, MINUTE))
            .with_category(Category::Chat, Limit::new(5, MINUTE));
        let (limiter, _clock) = limiter_with(table, FailurePolicy::Open);
        let actor = ActorId::from("a");
        assert!(limiter.allow(&actor, Category::Ask));
        assert!(!limiter.allow(&actor, Category::Chat));
        assert_eq!(limiter.stats(&actor).category(Category::Chat).unwrap().used, 0);
    }

    #[test]
    fn unconfigured_category_only_counts_globally() {
        let (limiter, _clock) = limiter_with(chat_only(1), FailurePolicy::Open);
        let actor = ActorId::from("a");
        for _ in 0..10 {
            assert!(limiter.allow(&actor, Category::Moderate));
        }
        assert_eq!(limiter.stats(&actor).global.used, 10);
        assert_eq!(
            limiter.time_until_reset(&actor, Some(Category::Moderate)),
            Duration::ZERO
        );
    }

    #[test]
    fn limit_holds_after_clock_steps_back() {
        let (limiter, clock) = limiter_with(chat_only(3), FailurePolicy::Open);
        let actor = ActorId::from("a");
        clock.advance(MINUTE);
        for _ in 0..3 {
            assert!(limiter.allow(&actor, Category::Chat));
        }
        assert!(!limiter.allow(&actor, Category::Chat));

        clock.rewind(Duration::from_secs(2));
        let admitted = (0..100)
            .filter(|_| limiter.allow(&actor, Category::Chat))
            .count();
        assert_eq!(admitted, 0);

        // Slots free up a full window after the newest recorded occurrence.
        clock.advance(MINUTE + Duration::from_secs(3));
        assert!(limiter.allow(&actor, Category::Chat));
    }

    #[test]
    fn admissions_after_step_back_are_recorded() {
        let (limiter, clock) = limiter_with(chat_only(5), FailurePolicy::Open);
        let actor = ActorId::from("a");
        clock.advance(MINUTE);
        assert!(limiter.allow(&actor, Category::Chat));
        clock.rewind(Duration::from_secs(30));
        assert!(limiter.allow(&actor, Category::Chat));
        clock.advance(Duration::from_secs(30));
        assert_eq!(limiter.stats(&actor).global.used, 2);
    }

    fn corrupt(limiter: &AdmissionLimiter, actor: &ActorId) {
        let mut windows = limiter.actors.entry(actor.clone()).or_default();
        windows.global.push_unordered(limiter.clock.now() - chrono::TimeDelta::seconds(10));
    }

    #[test]
    fn corrupted_state_fails_open_by_default() {
        let (limiter, _clock) = limiter_with(chat_only(1), FailurePolicy::Open);
        let actor = ActorId::from("a");
        assert!(limiter.allow(&actor, Category::Chat));
        corrupt(&limiter, &actor);
        assert!(limiter.allow(&actor, Category::Chat));
        assert_eq!(limiter.stats(&actor).category(Category::Chat).unwrap().used, 1);
    }

    #[test]
    fn corrupted_state_fails_closed_when_configured() {
        let (limiter, _clock) = limiter_with(chat_only(5), FailurePolicy::Closed);
        let actor = ActorId::from("a");
        assert!(limiter.allow(&actor, Category::Chat));
        corrupt(&limiter, &actor);
        assert!(!limiter.allow(&actor, Category::Chat));
    }

    #[test]
    fn reset_single_category_keeps_global() {
        let (limiter, _clock) = limiter_with(chat_only(1), FailurePolicy::Open);
        let actor = ActorId::from("a");
        assert!(limiter.allow(&actor, Category::Chat));
        limiter.reset(&actor, Some(Category::Chat));
        assert!(limiter.allow(&actor, Category::Chat));
        assert_eq!(limiter.stats(&actor).global.used, 2);
    }

    #[test]
    fn reset_all_forgets_actor() {
        let (limiter, _clock) = limiter_with(chat_only(1), FailurePolicy::Open);
        let actor = ActorId::from("a");
        assert!(limiter.allow(&actor, Category::Chat));
        limiter.reset(&actor, None);
        assert_eq!(limiter.tracked_actors(), 0);
        assert!(limiter.allow(&actor, Category::Chat));
    }

    #[test]
    fn reads_do_not_create_state() {
        let (limiter, _clock) = limiter_with(chat_only(1), FailurePolicy::Open);
        let actor = ActorId::from("ghost");
        let _ = limiter.stats(&actor);
        let _ = limiter.time_until_reset(&actor, None);
        assert_eq!(limiter.tracked_actors(), 0);
    }

    #[test]
    fn sweep_removes_idle_actors_only() {
        let (limiter, clock) = limiter_with(chat_only(5), FailurePolicy::Open);
        let idle = ActorId::from("idle");
        let busy = ActorId::from("busy");
        assert!(limiter.allow(&idle, Category::Chat));
        clock.advance(Duration::from_secs(45));
        assert!(limiter.allow(&busy, Category::Chat));
        clock.advance(Duration::from_secs(30));

        let report = limiter.sweep();
        assert_eq!(report.actors_removed, 1);
        assert_eq!(report.actors_remaining, 1);
        assert_eq!(report.occurrences_evicted, 2);
        assert_eq!(limiter.stats(&busy).global.used, 1);
    }

    #[tracing_test::traced_test]
    #[test]
    fn denial_is_logged() {
        let (limiter, _clock) = limiter_with(chat_only(1), FailurePolicy::Open);
        let actor = ActorId::from("loud");
        assert!(limiter.allow(&actor, Category::Chat));
        assert!(!limiter.allow(&actor, Category::Chat));
        assert!(logs_contain("actor hit category rate limit"));
    }
}
