// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON backup and restore of a single conversation bucket.
//!
//! The payload is an array of `{"role", "content", "timestamp"}` objects.
//! On restore, entries without a usable role or content are skipped rather
//! than failing the whole import, and a missing timestamp means "now".
//! Timestamps may be RFC 3339 or naive ISO 8601 (read as UTC).

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use gatehouse_core::{ActorId, GatehouseError, Role, ScopeId};
use serde_json::Value;
use tracing::warn;

use crate::store::ContextStore;
use crate::types::ImportEntry;

/// What happened to the entries handed to an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Entries now in the bucket.
    pub imported: usize,
    /// Entries skipped because a required field was missing or unusable.
    pub skipped_malformed: usize,
    /// Oldest entries dropped to respect the bucket capacity.
    pub dropped_over_capacity: usize,
    /// Entries already older than the retention duration.
    pub dropped_expired: usize,
}

impl ContextStore {
    /// Serializes the bucket as a pretty-printed JSON array.
    pub fn export_json(&self, actor: &ActorId, scope: &ScopeId) -> Result<String, GatehouseError> {
        Ok(serde_json::to_string_pretty(&self.export(actor, scope))?)
    }

    /// Replaces the bucket with the entries of a JSON array.
    ///
    /// Fails only when the payload is not a JSON array; individual bad
    /// entries are counted in [`ImportReport::skipped_malformed`].
    pub fn import_json(
        &self,
        actor: &ActorId,
        scope: &ScopeId,
        json: &str,
    ) -> Result<ImportReport, GatehouseError> {
        let values: Vec<Value> = serde_json::from_str(json)?;

        let mut skipped = 0;
        let entries: Vec<ImportEntry> = values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| match parse_entry(value) {
                Ok(entry) => Some(entry),
                Err(reason) => {
                    warn!(actor = %actor, scope = %scope, index, reason, "skipping malformed entry");
                    skipped += 1;
                    None
                }
            })
            .collect();

        let mut report = self.import(actor, scope, entries);
        report.skipped_malformed = skipped;
        Ok(report)
    }
}

fn parse_entry(value: &Value) -> Result<ImportEntry, &'static str> {
    let object = value.as_object().ok_or("entry is not an object")?;

    let role = object
        .get("role")
        .and_then(Value::as_str)
        .ok_or("missing role")?;
    let role = Role::from_str(role).map_err(|_| "unknown role")?;

    let content = object
        .get("content")
        .and_then(Value::as_str)
        .ok_or("missing content")?
        .to_string();

    let recorded_at = match object.get("timestamp") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(parse_timestamp(s).ok_or("unparsable timestamp")?),
        Some(_) => return Err("timestamp is not a string"),
    };

    Ok(ImportEntry {
        role,
        content,
        recorded_at,
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_and_naive_timestamps() {
        let rfc = parse_timestamp("2026-01-01T10:00:00Z").unwrap();
        let naive = parse_timestamp("2026-01-01T10:00:00.250000").unwrap();
        assert_eq!((naive - rfc).num_milliseconds(), 250);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn entry_without_role_is_malformed() {
        let value: Value = serde_json::json!({ "content": "hi" });
        assert_eq!(parse_entry(&value), Err("missing role"));
    }

    #[test]
    fn entry_with_unknown_role_is_malformed() {
        let value: Value = serde_json::json!({ "role": "system", "content": "hi" });
        assert_eq!(parse_entry(&value), Err("unknown role"));
    }

    #[test]
    fn entry_without_timestamp_has_none() {
        let value: Value = serde_json::json!({ "role": "assistant", "content": "hi" });
        let entry = parse_entry(&value).unwrap();
        assert_eq!(entry.role, Role::Assistant);
        assert_eq!(entry.recorded_at, None);
    }
}
