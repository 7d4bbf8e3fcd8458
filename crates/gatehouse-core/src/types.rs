// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity and message types shared by the limiter and the context store.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The identity rate limits and conversation buckets are partitioned by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for ActorId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Conversation scope a bucket belongs to beyond its actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeId {
    /// Direct conversation outside of any guild/channel.
    Unscoped,
    /// A named scope such as a guild identifier.
    Named(String),
}

impl ScopeId {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unscoped => f.write_str("unscoped"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Who authored a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A class of operation with its own admission threshold.
///
/// The per-actor aggregate across all categories is not a variant; it is
/// addressed as "no category" wherever a category is optional.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Chat,
    Ask,
    Moderate,
}

impl Category {
    /// Every category, in report order.
    pub const ALL: [Category; 3] = [Category::Chat, Category::Ask, Category::Moderate];
}

/// A turn as handed to the generator: role and text, no timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub role: Role,
    pub content: String,
}
