// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static threshold table consumed by the limiter.

use std::collections::HashMap;
use std::time::Duration;

use gatehouse_config::model::{LimiterConfig, ThresholdConfig};
use gatehouse_core::Category;

/// Capacity over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub capacity: usize,
    pub window: Duration,
}

impl Limit {
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self { capacity, window }
    }
}

impl From<ThresholdConfig> for Limit {
    fn from(config: ThresholdConfig) -> Self {
        Self {
            capacity: config.capacity as usize,
            window: config.window(),
        }
    }
}

/// Category → limit, plus the global aggregate limit.
///
/// Categories absent from the table are unconfigured: only the global limit
/// applies to them.
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    global: Limit,
    categories: HashMap<Category, Limit>,
}

impl ThresholdTable {
    pub fn new(global: Limit) -> Self {
        Self {
            global,
            categories: HashMap::new(),
        }
    }

    /// Builder-style category registration.
    pub fn with_category(mut self, category: Category, limit: Limit) -> Self {
        self.categories.insert(category, limit);
        self
    }

    pub fn global(&self) -> Limit {
        self.global
    }

    pub fn category(&self, category: Category) -> Option<Limit> {
        self.categories.get(&category).copied()
    }

    /// Configured categories in [`Category::ALL`] order.
    pub fn configured(&self) -> impl Iterator<Item = (Category, Limit)> + '_ {
        Category::ALL
            .into_iter()
            .filter_map(|c| self.category(c).map(|limit| (c, limit)))
    }
}

impl From<&LimiterConfig> for ThresholdTable {
    fn from(config: &LimiterConfig) -> Self {
        config
            .categories
            .iter()
            .fold(Self::new(config.global.into()), |table, (category, t)| {
                table.with_category(category, t.into())
            })
    }
}
