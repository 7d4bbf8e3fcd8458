// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive capacities and windows and a parseable listen address.

use std::net::SocketAddr;

use crate::diagnostic::ConfigError;
use crate::model::{GatehouseConfig, ThresholdConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &GatehouseConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.general.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "general.log_level `{}` must be one of: {}",
                config.general.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    validate_threshold("limiter.global", &config.limiter.global, &mut errors);
    if !config.limiter.global.enabled {
        errors.push(ConfigError::Validation {
            message: "limiter.global.enabled cannot be false".to_string(),
        });
    }
    for (category, threshold) in config.limiter.categories.iter() {
        validate_threshold(
            &format!("limiter.categories.{category}"),
            &threshold,
            &mut errors,
        );
    }

    if config.memory.max_turns == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.max_turns must be at least 1".to_string(),
        });
    }

    if config.memory.retention_hours == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.retention_hours must be at least 1".to_string(),
        });
    }

    if config.memory.context_turns == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.context_turns must be at least 1".to_string(),
        });
    }

    if config.maintenance.sweep_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "maintenance.sweep_interval_secs must be at least 1".to_string(),
        });
    }

    if config
        .metrics
        .listen_address
        .trim()
        .parse::<SocketAddr>()
        .is_err()
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "metrics.listen_address `{}` is not a valid socket address",
                config.metrics.listen_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_threshold(key: &str, threshold: &ThresholdConfig, errors: &mut Vec<ConfigError>) {
    if threshold.capacity == 0 {
        errors.push(ConfigError::Validation {
            message: format!("{key}.capacity must be at least 1"),
        });
    }
    if threshold.window_secs == 0 {
        errors.push(ConfigError::Validation {
            message: format!("{key}.window_secs must be at least 1"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = GatehouseConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let mut config = GatehouseConfig::default();
        config.limiter.categories.chat = Some(ThresholdConfig::per_minute(0));
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "limiter.categories.chat.capacity"));
    }

    #[test]
    fn disabled_category_skips_threshold_checks() {
        let mut config = GatehouseConfig::default();
        config.limiter.categories.ask = Some(ThresholdConfig {
            capacity: 0,
            window_secs: 0,
            enabled: false,
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn global_threshold_cannot_be_disabled() {
        let mut config = GatehouseConfig::default();
        config.limiter.global.enabled = false;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "limiter.global.enabled"));
    }

    #[test]
    fn zero_global_window_fails_validation() {
        let mut config = GatehouseConfig::default();
        config.limiter.global.window_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "limiter.global.window_secs"));
    }

    #[test]
    fn memory_bounds_are_collected_together() {
        let mut config = GatehouseConfig::default();
        config.memory.max_turns = 0;
        config.memory.retention_hours = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(has_message(&errors, "max_turns"));
        assert!(has_message(&errors, "retention_hours"));
    }

    #[test]
    fn bad_listen_address_fails_validation() {
        let mut config = GatehouseConfig::default();
        config.metrics.listen_address = "not an address".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "metrics.listen_address"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = GatehouseConfig::default();
        config.general.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "general.log_level"));
    }
}
