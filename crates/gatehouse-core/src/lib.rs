// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Gatehouse.
//!
//! This crate provides the identity types, error types, and the two external
//! capabilities (clock and text generator) shared by the admission limiter,
//! the context store, and the caller-side conversation flow.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{GatehouseError, GeneratorError};
pub use types::{ActorId, Category, ContextMessage, Role, ScopeId};

pub use traits::{Clock, Generator, SystemClock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gatehouse_error_has_all_variants() {
        let _config = GatehouseError::Config("test".into());
        let _serialization = GatehouseError::Serialization {
            source: Box::new(std::io::Error::other("test")),
        };
        let _generator = GatehouseError::Generator(GeneratorError::QuotaExceeded);
        let _invariant = GatehouseError::InvariantViolation("test".into());
        let _internal = GatehouseError::Internal("test".into());
    }

    #[test]
    fn category_display_and_parse_round_trip() {
        use std::str::FromStr;

        for category in Category::ALL {
            let s = category.to_string();
            let parsed = Category::from_str(&s).expect("should parse back");
            assert_eq!(category, parsed);
        }
        assert_eq!(Category::Moderate.to_string(), "moderate");
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).expect("should serialize");
        assert_eq!(json, "\"assistant\"");
        let parsed: Role = serde_json::from_str("\"user\"").expect("should deserialize");
        assert_eq!(parsed, Role::User);
    }

    #[test]
    fn capability_traits_are_object_safe() {
        fn _assert_clock(_: &dyn Clock) {}
        fn _assert_generator(_: &dyn Generator) {}
    }
}
