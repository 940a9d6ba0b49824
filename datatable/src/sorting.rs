//! Sort state and the per-column sort cycle.

use serde::{Deserialize, Serialize};

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One entry of the sort descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSort {
    pub column_id: String,
    pub direction: SortDirection,
}

/// Ordered sort descriptor. Only the first entry is honored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortingState(pub Vec<ColumnSort>);

impl SortingState {
    /// No sorting.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Sort by a single column.
    pub fn by(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self(vec![ColumnSort {
            column_id: column_id.into(),
            direction,
        }])
    }

    /// The honored sort entry.
    pub fn primary(&self) -> Option<&ColumnSort> {
        self.0.first()
    }

    /// Direction of a column, `None` when it is unsorted.
    pub fn direction(&self, column_id: &str) -> Option<SortDirection> {
        self.primary()
            .filter(|sort| sort.column_id == column_id)
            .map(|sort| sort.direction)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Advance the sort cycle for a column.
    ///
    /// Cycles `unsorted -> asc -> desc -> unsorted`. Activating a column that
    /// is not the sorted one resets every other column first.
    pub fn toggled(&self, column_id: &str) -> SortingState {
        match self.direction(column_id) {
            None => SortingState::by(column_id, SortDirection::Asc),
            Some(SortDirection::Asc) => SortingState::by(column_id, SortDirection::Desc),
            Some(SortDirection::Desc) => SortingState::none(),
        }
    }
}
