//! Row selection state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tri-state of the "select all rows on this page" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Checked,
    /// Some but not all eligible rows are selected.
    Indeterminate,
}

/// Selected rows keyed by row id. Absent and `false` both mean unselected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowSelection(pub BTreeMap<String, bool>);

impl RowSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a row is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    /// Copy with one row set to `selected`.
    pub fn with(&self, id: &str, selected: bool) -> Self {
        let mut next = self.clone();
        if selected {
            next.0.insert(id.to_string(), true);
        } else {
            next.0.remove(id);
        }
        next
    }

    /// Copy with a row flipped.
    pub fn toggled(&self, id: &str) -> Self {
        self.with(id, !self.is_selected(id))
    }

    /// Copy with every given row set to `selected`; other rows untouched.
    pub fn with_all<'a>(&self, ids: impl IntoIterator<Item = &'a str>, selected: bool) -> Self {
        let mut next = self.clone();
        for id in ids {
            if selected {
                next.0.insert(id.to_string(), true);
            } else {
                next.0.remove(id);
            }
        }
        next
    }

    /// Ids currently selected.
    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| id.as_str())
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected_ids().next().is_none()
    }

    /// Header checkbox state over the given rows.
    pub fn check_state<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> CheckState {
        let mut total = 0;
        let mut selected = 0;
        for id in ids {
            total += 1;
            if self.is_selected(id) {
                selected += 1;
            }
        }
        match selected {
            0 => CheckState::Unchecked,
            n if n == total => CheckState::Checked,
            _ => CheckState::Indeterminate,
        }
    }
}
