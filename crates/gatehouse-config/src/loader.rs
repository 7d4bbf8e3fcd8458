// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./gatehouse.toml` > `~/.config/gatehouse/gatehouse.toml` > `/etc/gatehouse/gatehouse.toml`
//! with environment variable overrides via `GATEHOUSE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::GatehouseConfig;

pub(crate) const LOCAL_CONFIG: &str = "gatehouse.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/gatehouse/gatehouse.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gatehouse/gatehouse.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/gatehouse/gatehouse.toml` (system-wide)
/// 3. `~/.config/gatehouse/gatehouse.toml` (user XDG config)
/// 4. `./gatehouse.toml` (local directory)
/// 5. `GATEHOUSE_*` environment variables
pub fn load_config() -> Result<GatehouseConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<GatehouseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GatehouseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GatehouseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GatehouseConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GatehouseConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section mapping.
///
/// Key names contain underscores, so `Env::split("_")` would be ambiguous:
/// `GATEHOUSE_MEMORY_MAX_TURNS` must become `memory.max_turns`, and
/// `GATEHOUSE_LIMITER_CATEGORIES_CHAT_CAPACITY` must become
/// `limiter.categories.chat.capacity`.
fn env_provider() -> Env {
    Env::prefixed("GATEHOUSE_").map(|key| map_env_key(key.as_str()).into())
}

/// Nested prefixes first; the first match wins. Matched against the
/// lower-cased key.
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("limiter_global_", "limiter.global."),
    ("limiter_categories_chat_", "limiter.categories.chat."),
    ("limiter_categories_ask_", "limiter.categories.ask."),
    ("limiter_categories_moderate_", "limiter.categories.moderate."),
    ("limiter_", "limiter."),
    ("memory_", "memory."),
    ("maintenance_", "maintenance."),
    ("metrics_", "metrics."),
    ("general_", "general."),
];

/// Maps a prefix-stripped env key (figment keeps its original case) to a
/// dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for (prefix, section) in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{section}{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_nested_sections() {
        assert_eq!(map_env_key("memory_max_turns"), "memory.max_turns");
        assert_eq!(
            map_env_key("limiter_categories_chat_capacity"),
            "limiter.categories.chat.capacity"
        );
        assert_eq!(
            map_env_key("limiter_global_window_secs"),
            "limiter.global.window_secs"
        );
        assert_eq!(
            map_env_key("limiter_failure_policy"),
            "limiter.failure_policy"
        );
        assert_eq!(map_env_key("general_log_level"), "general.log_level");
    }

    #[test]
    fn upper_case_env_keys_are_mapped() {
        assert_eq!(map_env_key("MEMORY_MAX_TURNS"), "memory.max_turns");
        assert_eq!(
            map_env_key("LIMITER_CATEGORIES_ASK_CAPACITY"),
            "limiter.categories.ask.capacity"
        );
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[memory]
max_turns = 5
"#,
            )?;
            jail.set_env("GATEHOUSE_MEMORY_MAX_TURNS", "7");
            jail.set_env("GATEHOUSE_LIMITER_CATEGORIES_ASK_CAPACITY", "2");

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.memory.max_turns, 7);
            let ask = config
                .limiter
                .categories
                .ask
                .expect("ask keeps its default window");
            assert_eq!(ask.capacity, 2);
            assert_eq!(ask.window_secs, 60);
            Ok(())
        });
    }
}
