//! Render snapshot of a table.
//!
//! A [`TableView`] is what the host draws: it carries no behavior and is
//! rebuilt from the engine on every render.

use crate::pagination::PaginationView;
use crate::row::CellValue;
use crate::selection::CheckState;
use crate::sorting::SortDirection;
use crate::toolbar::ToolbarView;

/// The whole table for one render.
#[derive(Debug, Clone, PartialEq)]
pub enum TableView {
    /// Placeholder grid while rows load.
    Loading(SkeletonView),
    Ready(Box<ReadyView>),
}

impl TableView {
    pub fn ready(&self) -> Option<&ReadyView> {
        match self {
            TableView::Ready(view) => Some(view),
            TableView::Loading(_) => None,
        }
    }
}

/// Skeleton dimensions: one cell per rendered column, one line per page row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonView {
    pub columns: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyView {
    pub toolbar: ToolbarView,
    pub headers: Vec<HeaderCell>,
    pub body: TableBody,
    /// Present when mobile cards are enabled and a card renderer is set.
    pub cards: Option<Vec<CardView>>,
    /// Absent when there is at most one page.
    pub pagination: Option<PaginationView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub column_id: String,
    pub kind: HeaderKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderKind {
    /// The "select all rows on this page" checkbox.
    SelectAll(CheckState),
    Data {
        label: String,
        sortable: bool,
        sort: Option<SortDirection>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    Rows(Vec<BodyRow>),
    /// No rows: the message spans every rendered column.
    Empty { message: String, colspan: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyRow {
    pub id: String,
    pub selected: bool,
    pub clickable: bool,
    pub cells: Vec<BodyCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyCell {
    Checkbox(bool),
    Value(CellValue),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: String,
    pub selected: bool,
    pub show_checkbox: bool,
    pub content: String,
}
