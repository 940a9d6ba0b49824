//! Table options: the caller-facing prop surface.

use std::fmt;
use std::sync::Arc;

use crate::callback::Callback;
use crate::column::ColumnDef;
use crate::config::TableConfig;
use crate::export::ExportScope;
use crate::row::{RowIdAccessor, TableRow};
use crate::row_model::{ClientRowModel, RowComputation};
use crate::selection::RowSelection;
use crate::slice::SliceSource;
use crate::sorting::SortingState;
use crate::state::{ColumnFilters, PaginationState, VisibilityState};
use crate::toolbar::ToolbarAction;

/// Where sorting, filtering and pagination are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputationMode {
    /// Rows are sorted, filtered and paged in memory.
    Client,
    /// Rows arrive already processed; the caller supplies the page count.
    Server,
}

/// Optional value and change callback for one state slice.
#[derive(Debug, Clone)]
pub struct SliceProps<T> {
    pub value: Option<T>,
    pub on_change: Option<Callback<T>>,
}

impl<T> Default for SliceProps<T> {
    fn default() -> Self {
        Self {
            value: None,
            on_change: None,
        }
    }
}

impl<T: Clone> SliceProps<T> {
    pub(crate) fn source(&self, name: &str) -> SliceSource<T> {
        SliceSource::resolve(name, self.value.clone(), self.on_change.clone())
    }
}

/// Renders a row as a mobile card.
pub struct CardRenderer<R>(Arc<dyn Fn(&R) -> String + Send + Sync>);

impl<R> CardRenderer<R> {
    pub fn new(f: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn render(&self, row: &R) -> String {
        (self.0)(row)
    }
}

impl<R> Clone for CardRenderer<R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<R> fmt::Debug for CardRenderer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CardRenderer(..)")
    }
}

/// Everything a table is rendered from.
///
/// Build one per render; pass the first to [`TableStateEngine::new`] and
/// later ones to [`TableStateEngine::update`].
///
/// [`TableStateEngine::new`]: super::TableStateEngine::new
/// [`TableStateEngine::update`]: super::TableStateEngine::update
#[derive(Clone)]
pub struct TableOptions<R: TableRow> {
    pub(crate) data: Vec<R>,
    pub(crate) columns: Vec<ColumnDef>,
    pub(crate) config: TableConfig,
    pub(crate) loading: bool,
    pub(crate) page_count: Option<i64>,
    pub(crate) pagination: SliceProps<PaginationState>,
    pub(crate) sorting: SliceProps<SortingState>,
    pub(crate) column_filters: SliceProps<ColumnFilters>,
    pub(crate) global_filter: SliceProps<String>,
    pub(crate) column_visibility: SliceProps<VisibilityState>,
    pub(crate) row_selection: SliceProps<RowSelection>,
    pub(crate) enable_row_selection: bool,
    pub(crate) enable_column_toggle: bool,
    pub(crate) enable_export: bool,
    pub(crate) export_scope: ExportScope,
    pub(crate) enable_mobile_card: bool,
    pub(crate) mobile_card: Option<CardRenderer<R>>,
    pub(crate) toolbar_actions: Vec<ToolbarAction>,
    pub(crate) on_row_click: Option<Callback<R>>,
    pub(crate) get_row_id: Option<RowIdAccessor<R>>,
    pub(crate) computation: Arc<dyn RowComputation<R>>,
}

impl<R: TableRow> fmt::Debug for TableOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("rows", &self.data.len())
            .field("columns", &self.columns)
            .field("loading", &self.loading)
            .field("page_count", &self.page_count)
            .field("mode", &self.computation_mode())
            .finish_non_exhaustive()
    }
}

impl<R: TableRow> TableOptions<R> {
    pub fn new(columns: Vec<ColumnDef>, data: Vec<R>) -> Self {
        Self {
            data,
            columns,
            config: TableConfig::default(),
            loading: false,
            page_count: None,
            pagination: SliceProps::default(),
            sorting: SliceProps::default(),
            column_filters: SliceProps::default(),
            global_filter: SliceProps::default(),
            column_visibility: SliceProps::default(),
            row_selection: SliceProps::default(),
            enable_row_selection: false,
            enable_column_toggle: true,
            enable_export: false,
            export_scope: ExportScope::default(),
            enable_mobile_card: false,
            mobile_card: None,
            toolbar_actions: Vec::new(),
            on_row_click: None,
            get_row_id: None,
            computation: Arc::new(ClientRowModel),
        }
    }

    /// Server mode needs a pagination change callback plus either a
    /// controlled pagination value or a supplied page count.
    ///
    /// Derived from the current options every time; never stored.
    pub fn computation_mode(&self) -> ComputationMode {
        let has_callback = self.pagination.on_change.is_some();
        let has_signal = self.pagination.value.is_some() || self.page_count.is_some();
        if has_callback && has_signal {
            ComputationMode::Server
        } else {
            ComputationMode::Client
        }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn data(&self) -> &[R] {
        &self.data
    }

    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Show the loading skeleton instead of rows.
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Total pages, as reported by a server.
    pub fn page_count(mut self, page_count: i64) -> Self {
        self.page_count = Some(page_count);
        self
    }

    pub fn pagination(mut self, value: PaginationState) -> Self {
        self.pagination.value = Some(value);
        self
    }

    pub fn on_pagination_change(
        mut self,
        f: impl Fn(PaginationState) + Send + Sync + 'static,
    ) -> Self {
        self.pagination.on_change = Some(Callback::new(f));
        self
    }

    pub fn sorting(mut self, value: SortingState) -> Self {
        self.sorting.value = Some(value);
        self
    }

    pub fn on_sorting_change(mut self, f: impl Fn(SortingState) + Send + Sync + 'static) -> Self {
        self.sorting.on_change = Some(Callback::new(f));
        self
    }

    pub fn column_filters(mut self, value: ColumnFilters) -> Self {
        self.column_filters.value = Some(value);
        self
    }

    pub fn on_column_filters_change(
        mut self,
        f: impl Fn(ColumnFilters) + Send + Sync + 'static,
    ) -> Self {
        self.column_filters.on_change = Some(Callback::new(f));
        self
    }

    pub fn global_filter(mut self, value: impl Into<String>) -> Self {
        self.global_filter.value = Some(value.into());
        self
    }

    pub fn on_global_filter_change(mut self, f: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.global_filter.on_change = Some(Callback::new(f));
        self
    }

    pub fn column_visibility(mut self, value: VisibilityState) -> Self {
        self.column_visibility.value = Some(value);
        self
    }

    pub fn on_column_visibility_change(
        mut self,
        f: impl Fn(VisibilityState) + Send + Sync + 'static,
    ) -> Self {
        self.column_visibility.on_change = Some(Callback::new(f));
        self
    }

    pub fn row_selection(mut self, value: RowSelection) -> Self {
        self.row_selection.value = Some(value);
        self
    }

    pub fn on_row_selection_change(
        mut self,
        f: impl Fn(RowSelection) + Send + Sync + 'static,
    ) -> Self {
        self.row_selection.on_change = Some(Callback::new(f));
        self
    }

    /// Prepend the selection column and allow selecting rows.
    pub fn enable_row_selection(mut self, enabled: bool) -> Self {
        self.enable_row_selection = enabled;
        self
    }

    /// Show the column visibility menu. On by default.
    pub fn enable_column_toggle(mut self, enabled: bool) -> Self {
        self.enable_column_toggle = enabled;
        self
    }

    pub fn enable_export(mut self, enabled: bool) -> Self {
        self.enable_export = enabled;
        self
    }

    pub fn export_scope(mut self, scope: ExportScope) -> Self {
        self.export_scope = scope;
        self
    }

    /// Base name of exported files.
    pub fn export_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.export_file_name = name.into();
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.config.empty_message = message.into();
        self
    }

    pub fn enable_mobile_card(mut self, enabled: bool) -> Self {
        self.enable_mobile_card = enabled;
        self
    }

    pub fn mobile_card(mut self, f: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.mobile_card = Some(CardRenderer::new(f));
        self
    }

    pub fn toolbar_action(mut self, action: ToolbarAction) -> Self {
        self.toolbar_actions.push(action);
        self
    }

    pub fn on_row_click(mut self, f: impl Fn(R) + Send + Sync + 'static) -> Self {
        self.on_row_click = Some(Callback::new(f));
        self
    }

    /// Stable row ids. Needed for selection to survive sorting, filtering and
    /// paging.
    pub fn get_row_id(mut self, f: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.get_row_id = Some(RowIdAccessor::new(f));
        self
    }

    /// Replace the client-side row computation.
    pub fn computation(mut self, computation: impl RowComputation<R> + 'static) -> Self {
        self.computation = Arc::new(computation);
        self
    }
}
