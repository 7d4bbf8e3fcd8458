// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only usage reports.

use std::time::Duration;

use gatehouse_core::Category;
use serde::Serialize;

/// Usage of one limit for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitReport {
    /// Occurrences currently inside the window.
    pub used: usize,
    pub capacity: usize,
    pub window: Duration,
    pub time_until_reset: Duration,
}

impl LimitReport {
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.used)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    #[serde(flatten)]
    pub limit: LimitReport,
}

/// Global usage plus every configured category, in [`Category::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorReport {
    pub global: LimitReport,
    pub categories: Vec<CategoryReport>,
}

impl ActorReport {
    pub fn category(&self, category: Category) -> Option<&LimitReport> {
        self.categories
            .iter()
            .find(|r| r.category == category)
            .map(|r| &r.limit)
    }
}
