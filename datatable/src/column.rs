//! Column definitions and the metadata derived from them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::TableError;

/// Id of the synthetic row-selection column.
pub const SELECTION_COLUMN_ID: &str = "select";

// =============================================================================
// Header
// =============================================================================

/// Column header: plain text or a caller-supplied renderer.
#[derive(Clone)]
pub enum Header {
    Text(String),
    Render(Arc<dyn Fn() -> String + Send + Sync>),
}

impl Header {
    /// Plain text of the header, if it has one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Header::Text(text) => Some(text),
            Header::Render(_) => None,
        }
    }

    /// Rendered header content.
    pub fn render(&self) -> String {
        match self {
            Header::Text(text) => text.clone(),
            Header::Render(f) => f(),
        }
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Header::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Header::Render(_) => f.write_str("Render(..)"),
        }
    }
}

// =============================================================================
// ColumnDef
// =============================================================================

/// A caller-supplied data column.
#[derive(Clone, Debug)]
pub struct ColumnDef {
    /// Resolved identity: the explicit id, otherwise the accessor key.
    pub id: String,
    pub header: Header,
    /// Key into the row. Display-only columns have none.
    pub accessor: Option<String>,
    pub sortable: bool,
    pub hideable: bool,
}

impl ColumnDef {
    /// Create a column reading `accessor` from each row. Its id is the
    /// accessor key.
    pub fn accessor(accessor: impl Into<String>, header: impl Into<String>) -> Self {
        let accessor = accessor.into();
        Self {
            id: accessor.clone(),
            header: Header::Text(header.into()),
            accessor: Some(accessor),
            sortable: true,
            hideable: true,
        }
    }

    /// Create a display-only column (row actions, badges) with an explicit id.
    pub fn display(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: Header::Text(header.into()),
            accessor: None,
            sortable: false,
            hideable: true,
        }
    }

    /// Override the resolved id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Render the header through a closure instead of plain text.
    pub fn header_with(mut self, render: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.header = Header::Render(Arc::new(render));
        self
    }

    /// Set whether header activation sorts by this column.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Set whether the column appears in the visibility toggle menu.
    pub fn hideable(mut self, hideable: bool) -> Self {
        self.hideable = hideable;
        self
    }

    /// Check if the column can sort: flagged sortable and backed by an accessor.
    pub fn can_sort(&self) -> bool {
        self.sortable && self.accessor.is_some()
    }

    /// Menu label: header text, falling back to the id.
    pub fn label(&self) -> String {
        self.header
            .text()
            .map(str::to_string)
            .unwrap_or_else(|| self.id.clone())
    }
}

// =============================================================================
// Column
// =============================================================================

/// A rendered column: structural columns owned by the table, then the
/// caller's data columns.
#[derive(Clone, Debug)]
pub enum Column {
    /// Row-selection checkboxes. Never sortable, hideable or exported.
    Selection,
    Data(ColumnDef),
}

impl Column {
    pub fn id(&self) -> &str {
        match self {
            Column::Selection => SELECTION_COLUMN_ID,
            Column::Data(def) => &def.id,
        }
    }

    pub fn is_structural(&self) -> bool {
        !matches!(self, Column::Data(_))
    }

    pub fn can_sort(&self) -> bool {
        match self {
            Column::Selection => false,
            Column::Data(def) => def.can_sort(),
        }
    }

    pub fn can_hide(&self) -> bool {
        match self {
            Column::Selection => false,
            Column::Data(def) => def.hideable,
        }
    }
}

/// Compose the structural columns with the caller's data columns.
pub fn compose_columns(data: &[ColumnDef], selection: bool) -> Vec<Column> {
    let mut columns = Vec::with_capacity(data.len() + 1);
    if selection {
        columns.push(Column::Selection);
    }
    columns.extend(data.iter().cloned().map(Column::Data));
    columns
}

/// Check column ids for emptiness, duplicates and the reserved selection id.
pub fn validate_columns(columns: &[ColumnDef]) -> Result<(), TableError> {
    let mut seen = HashSet::with_capacity(columns.len());
    for (i, col) in columns.iter().enumerate() {
        if col.id.is_empty() {
            return Err(TableError::EmptyColumnId(i));
        }
        if col.id == SELECTION_COLUMN_ID {
            return Err(TableError::ReservedColumnId(col.id.clone()));
        }
        if !seen.insert(col.id.as_str()) {
            return Err(TableError::DuplicateColumnId(col.id.clone()));
        }
    }
    Ok(())
}

// =============================================================================
// ColumnModel
// =============================================================================

/// Entry in the column visibility menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnToggleOption {
    pub id: String,
    pub label: String,
}

/// Column included in exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportColumn {
    pub header: String,
    pub accessor_key: String,
}

/// Toggle and export metadata derived from the data columns.
///
/// Recomputed from the column list whenever it is needed; structural columns
/// never reach it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnModel {
    pub toggle_options: Vec<ColumnToggleOption>,
    pub export_columns: Vec<ExportColumn>,
}

impl ColumnModel {
    pub fn derive(columns: &[ColumnDef]) -> Self {
        let toggle_options = columns
            .iter()
            .filter(|col| col.hideable)
            .map(|col| ColumnToggleOption {
                id: col.id.clone(),
                label: col.label(),
            })
            .collect();

        let export_columns = columns
            .iter()
            .filter_map(|col| {
                let accessor = col.accessor.as_ref()?;
                Some(ExportColumn {
                    header: col
                        .header
                        .text()
                        .map(str::to_string)
                        .unwrap_or_else(|| accessor.clone()),
                    accessor_key: accessor.clone(),
                })
            })
            .collect();

        Self {
            toggle_options,
            export_columns,
        }
    }
}
