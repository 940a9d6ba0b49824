//! Toolbar: search box, column visibility menu and action slots.

use crate::callback::Callback;
use crate::column::ColumnToggleOption;
use crate::filter::FilterController;
use crate::state::VisibilityState;

/// A caller-supplied toolbar action.
#[derive(Debug, Clone)]
pub struct ToolbarAction {
    pub id: String,
    pub label: String,
    pub on_activate: Option<Callback<()>>,
}

impl ToolbarAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            on_activate: None,
        }
    }

    pub fn on_activate(mut self, f: impl Fn(()) + Send + Sync + 'static) -> Self {
        self.on_activate = Some(Callback::new(f));
        self
    }
}

/// One entry of the column visibility menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnToggleItem {
    pub id: String,
    pub label: String,
    pub visible: bool,
}

/// Rendered toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarView {
    pub search_text: String,
    pub search_placeholder: String,
    /// Empty when the column toggle is disabled or nothing can be hidden.
    pub column_toggles: Vec<ColumnToggleItem>,
    /// `(id, label)` of each caller action, in order.
    pub actions: Vec<(String, String)>,
    /// Whether the export trigger is shown.
    pub export_available: bool,
}

/// Composes the debounced search with visibility toggles and action slots.
#[derive(Debug)]
pub struct ToolbarController {
    filter: FilterController,
    search_placeholder: String,
}

impl ToolbarController {
    pub fn new(filter: FilterController, search_placeholder: impl Into<String>) -> Self {
        Self {
            filter,
            search_placeholder: search_placeholder.into(),
        }
    }

    pub fn filter(&self) -> &FilterController {
        &self.filter
    }

    /// Build the toolbar for the current state.
    pub fn view(
        &self,
        visibility: &VisibilityState,
        toggle_options: &[ColumnToggleOption],
        actions: &[ToolbarAction],
        export_available: bool,
    ) -> ToolbarView {
        let column_toggles = toggle_options
            .iter()
            .map(|opt| ColumnToggleItem {
                id: opt.id.clone(),
                label: opt.label.clone(),
                visible: visibility.is_visible(&opt.id),
            })
            .collect();

        ToolbarView {
            search_text: self.filter.buffer(),
            search_placeholder: self.search_placeholder.clone(),
            column_toggles,
            actions: actions
                .iter()
                .map(|a| (a.id.clone(), a.label.clone()))
                .collect(),
            export_available,
        }
    }
}

/// Invoke the action with the given id. Returns false for unknown ids.
pub fn activate_action(actions: &[ToolbarAction], id: &str) -> bool {
    let Some(action) = actions.iter().find(|a| a.id == id) else {
        return false;
    };
    if let Some(on_activate) = &action.on_activate {
        on_activate.call(());
    }
    true
}
