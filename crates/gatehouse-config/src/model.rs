// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Gatehouse.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use gatehouse_core::Category;
use serde::{Deserialize, Serialize};

/// Top-level Gatehouse configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to the values the bot shipped with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatehouseConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Admission limiter thresholds and fault policy.
    #[serde(default)]
    pub limiter: LimiterConfig,

    /// Conversation memory bounds.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Periodic sweep scheduling.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    /// Prometheus exporter settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// What `allow` answers when the limiter detects corrupted per-actor state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Admit the operation.
    #[default]
    Open,
    /// Deny the operation.
    Closed,
}

/// Capacity over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Maximum admitted operations inside the window.
    pub capacity: u32,

    /// Trailing window length in seconds.
    pub window_secs: u64,

    /// A disabled category threshold leaves the category unlimited except
    /// by `global`. The global threshold cannot be disabled.
    #[serde(default = "default_threshold_enabled")]
    pub enabled: bool,
}

fn default_threshold_enabled() -> bool {
    true
}

impl ThresholdConfig {
    pub const fn per_minute(capacity: u32) -> Self {
        Self {
            capacity,
            window_secs: 60,
            enabled: true,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Admission limiter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimiterConfig {
    /// Behavior on internal faults while evaluating `allow`.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Aggregate limit across every category for one actor.
    #[serde(default = "default_global_threshold")]
    pub global: ThresholdConfig,

    /// Per-category limits. A category left unset only counts against `global`.
    #[serde(default)]
    pub categories: CategoryThresholds,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            global: default_global_threshold(),
            categories: CategoryThresholds::default(),
        }
    }
}

fn default_global_threshold() -> ThresholdConfig {
    ThresholdConfig::per_minute(20)
}

/// Threshold for each member of the closed category set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryThresholds {
    #[serde(default)]
    pub chat: Option<ThresholdConfig>,

    #[serde(default)]
    pub ask: Option<ThresholdConfig>,

    #[serde(default)]
    pub moderate: Option<ThresholdConfig>,
}

impl CategoryThresholds {
    /// Enabled threshold for `category`, if any.
    pub fn get(&self, category: Category) -> Option<ThresholdConfig> {
        let threshold = match category {
            Category::Chat => self.chat,
            Category::Ask => self.ask,
            Category::Moderate => self.moderate,
        };
        threshold.filter(|t| t.enabled)
    }

    /// Configured `(category, threshold)` pairs in [`Category::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, ThresholdConfig)> + '_ {
        Category::ALL
            .into_iter()
            .filter_map(|category| self.get(category).map(|t| (category, t)))
    }
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self {
            chat: Some(ThresholdConfig::per_minute(10)),
            ask: Some(ThresholdConfig::per_minute(5)),
            moderate: Some(ThresholdConfig::per_minute(3)),
        }
    }
}

/// Conversation memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// When false, the conversation flow neither reads nor writes history.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Maximum turns kept per (actor, scope) bucket.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Age after which a turn is purged.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,

    /// Turns handed to the generator per request.
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,
}

impl MemoryConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_hours.saturating_mul(3600))
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            max_turns: default_max_turns(),
            retention_hours: default_retention_hours(),
            context_turns: default_context_turns(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_max_turns() -> usize {
    20
}

fn default_retention_hours() -> u64 {
    24
}

fn default_context_turns() -> usize {
    10
}

/// Maintenance task configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MaintenanceConfig {
    /// Seconds between limiter and store sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl MaintenanceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn default_sweep_interval_secs() -> u64 {
    300
}

/// Prometheus exporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Socket address the scrape endpoint listens on.
    #[serde(default = "default_metrics_listen_address")]
    pub listen_address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_address: default_metrics_listen_address(),
        }
    }
}

fn default_metrics_listen_address() -> String {
    "127.0.0.1:9464".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_limits() {
        let config = GatehouseConfig::default();
        assert_eq!(config.limiter.global, ThresholdConfig::per_minute(20));
        assert_eq!(
            config.limiter.categories.get(Category::Chat),
            Some(ThresholdConfig::per_minute(10))
        );
        assert_eq!(
            config.limiter.categories.get(Category::Ask),
            Some(ThresholdConfig::per_minute(5))
        );
        assert_eq!(
            config.limiter.categories.get(Category::Moderate),
            Some(ThresholdConfig::per_minute(3))
        );
        assert_eq!(config.limiter.failure_policy, FailurePolicy::Open);
        assert_eq!(config.memory.max_turns, 20);
        assert_eq!(config.memory.retention(), Duration::from_secs(24 * 3600));
    }

    #[test]
    fn category_iter_skips_unconfigured() {
        let thresholds = CategoryThresholds {
            chat: Some(ThresholdConfig::per_minute(1)),
            ask: None,
            moderate: Some(ThresholdConfig::per_minute(2)),
        };
        let categories: Vec<Category> = thresholds.iter().map(|(c, _)| c).collect();
        assert_eq!(categories, vec![Category::Chat, Category::Moderate]);
    }

    #[test]
    fn huge_retention_saturates() {
        let memory = MemoryConfig {
            retention_hours: u64::MAX / 1000,
            ..MemoryConfig::default()
        };
        assert_eq!(memory.retention(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn failure_policy_parses_lowercase() {
        let config: LimiterConfig = toml::from_str("failure_policy = \"closed\"").unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::Closed);
    }
}
