//! Filter, visibility and pagination state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-column filter needles keyed by column id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnFilters(pub BTreeMap<String, String>);

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column_id: &str) -> Option<&str> {
        self.0.get(column_id).map(String::as_str)
    }

    /// Copy with a filter set. An empty value removes the filter.
    pub fn with(&self, column_id: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        if value.is_empty() {
            next.0.remove(column_id);
        } else {
            next.0.insert(column_id.to_string(), value);
        }
        next
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Column visibility keyed by column id. Absent means visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilityState(pub BTreeMap<String, bool>);

impl VisibilityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, column_id: &str) -> bool {
        self.0.get(column_id).copied().unwrap_or(true)
    }

    /// Copy with a column flipped.
    pub fn toggled(&self, column_id: &str) -> Self {
        let mut next = self.clone();
        next.0.insert(column_id.to_string(), !self.is_visible(column_id));
        next
    }

    /// Copy with a column set explicitly.
    pub fn with(&self, column_id: &str, visible: bool) -> Self {
        let mut next = self.clone();
        next.0.insert(column_id.to_string(), visible);
        next
    }
}

/// Zero-based page index and a positive page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl PaginationState {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
        }
    }

    /// First page with the given size.
    pub fn first(page_size: usize) -> Self {
        Self::new(0, page_size)
    }

    /// Number of pages needed for `total` rows. Zero rows need zero pages.
    pub fn page_count_for(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.max(1))
    }

    /// Same page size, index clamped into `[0, page_count)`.
    pub fn clamped(self, page_count: usize) -> Self {
        let last = page_count.saturating_sub(1);
        Self {
            page_index: self.page_index.min(last),
            page_size: self.page_size.max(1),
        }
    }

    /// Row range covered by this page within `total` rows.
    pub fn row_range(&self, total: usize) -> std::ops::Range<usize> {
        let start = self.page_index.saturating_mul(self.page_size).min(total);
        let end = start.saturating_add(self.page_size).min(total);
        start..end
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::first(10)
    }
}
