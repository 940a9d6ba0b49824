//! Table state engine.
//!
//! [`TableStateEngine`] reconciles caller-owned and table-owned state for the
//! six slices a table renders from, computes the visible rows, and routes
//! interactions (sorting, paging, selection, search, export) back to whoever
//! owns the affected state.
//!
//! # Example
//!
//! ```ignore
//! let engine = TableStateEngine::new(
//!     TableOptions::new(columns, rows)
//!         .enable_row_selection(true)
//!         .get_row_id(|row: &Employee| row.id.to_string()),
//! )?;
//!
//! engine.toggle_sort("name");
//! engine.next_page();
//!
//! if let Some(ready) = engine.view().ready() {
//!     draw(ready);
//! }
//! ```

mod inner;
mod options;
mod view;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, Weak};

use chrono::NaiveDate;

pub use options::{CardRenderer, ComputationMode, SliceProps, TableOptions};
pub use view::{
    BodyCell, BodyRow, CardView, HeaderCell, HeaderKind, ReadyView, SkeletonView, TableBody,
    TableView,
};

use crate::callback::{Callback, Updater};
use crate::column::validate_columns;
use crate::error::{ExportError, TableError};
use crate::events::EventResult;
use crate::export::{ExportArtifact, ExportFormat};
use crate::filter::FilterController;
use crate::pagination::PaginationController;
use crate::row::TableRow;
use crate::selection::{CheckState, RowSelection};
use crate::sorting::{SortDirection, SortingState};
use crate::state::{ColumnFilters, PaginationState, VisibilityState};
use crate::toolbar::{ToolbarController, activate_action};

use inner::{EngineInner, Effects};

/// One row of the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView<R> {
    /// Row id used as the selection key.
    pub id: String,
    /// Index into the rows the table was given.
    pub index: usize,
    pub original: R,
    pub selected: bool,
}

/// Rows to render plus the counts the pagination needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RowModel<R> {
    pub rows: Vec<RowView<R>>,
    /// Rows remaining after filtering. In server mode, the rows given.
    pub filtered_count: usize,
    pub page_count: usize,
}

/// Shared handle to a table's state.
///
/// Cloning the handle shares the state. Change callbacks always run after the
/// internal lock is released, so they may call back into the engine.
pub struct TableStateEngine<R: TableRow> {
    inner: Arc<RwLock<EngineInner<R>>>,
    /// Set whenever something the view depends on changes.
    dirty: Arc<AtomicBool>,
}

impl<R: TableRow> Clone for TableStateEngine<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl<R: TableRow> std::fmt::Debug for TableStateEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStateEngine")
            .field("mode", &self.mode())
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}

impl<R: TableRow> TableStateEngine<R> {
    /// Create an engine from the first set of options.
    pub fn new(options: TableOptions<R>) -> Result<Self, TableError> {
        validate_columns(&options.columns)?;
        if options.enable_row_selection && options.get_row_id.is_none() {
            log::warn!(
                "row selection enabled without a row id accessor; selection is keyed by page \
                 position and is cleared whenever rows move"
            );
        }

        let dirty = Arc::new(AtomicBool::new(true));
        let inner = Arc::new_cyclic(|weak: &Weak<RwLock<EngineInner<R>>>| {
            let weak = weak.clone();
            let flag = Arc::clone(&dirty);
            // Debounced search lands here, outside any engine lock.
            let on_search = Callback::new(move |text: String| {
                if let Some(inner) = weak.upgrade() {
                    let engine = TableStateEngine {
                        inner,
                        dirty: Arc::clone(&flag),
                    };
                    engine.set_global_filter(text);
                }
            });
            let filter = FilterController::new(
                options.global_filter.value.clone().unwrap_or_default(),
                options.config.debounce,
                on_search,
            );
            let toolbar = Arc::new(ToolbarController::new(
                filter,
                options.config.search_placeholder.clone(),
            ));
            RwLock::new(EngineInner::new(options, toolbar))
        });

        Ok(Self { inner, dirty })
    }

    /// Re-render with new options.
    ///
    /// Controlled slices take the new values; uncontrolled state is kept.
    pub fn update(&self, options: TableOptions<R>) -> Result<(), TableError> {
        validate_columns(&options.columns)?;
        if let Ok(mut inner) = self.inner.write() {
            inner.resync(options);
        }
        self.mark_dirty();
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineInner<R>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a mutation, then its callbacks once the lock is released.
    fn mutate(&self, f: impl FnOnce(&mut EngineInner<R>) -> Option<Effects>) -> EventResult {
        let effects = match self.inner.write() {
            Ok(mut inner) => f(&mut inner),
            Err(_) => None,
        };
        match effects {
            Some(effects) => {
                self.mark_dirty();
                effects.run();
                EventResult::Consumed
            }
            None => EventResult::Ignored,
        }
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Check if the view needs rebuilding.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // State slices
    // -------------------------------------------------------------------------

    pub fn mode(&self) -> ComputationMode {
        self.read().mode()
    }

    pub fn sorting(&self) -> SortingState {
        self.read().sorting.value().clone()
    }

    pub fn set_sorting(&self, updater: impl Into<Updater<SortingState>>) -> EventResult {
        let updater = updater.into();
        self.mutate(|inner| Some(inner.set_sorting(updater)))
    }

    pub fn column_filters(&self) -> ColumnFilters {
        self.read().column_filters.value().clone()
    }

    pub fn set_column_filters(&self, updater: impl Into<Updater<ColumnFilters>>) -> EventResult {
        let updater = updater.into();
        self.mutate(|inner| Some(inner.set_column_filters(updater)))
    }

    /// Set one column's filter text. An empty value removes the filter.
    pub fn set_column_filter(&self, column_id: &str, value: impl Into<String>) -> EventResult {
        let column_id = column_id.to_string();
        let value = value.into();
        self.mutate(move |inner| {
            if !inner.options.columns.iter().any(|col| col.id == column_id) {
                return None;
            }
            Some(inner.set_column_filters(Updater::with(move |filters: &ColumnFilters| {
                filters.with(&column_id, value)
            })))
        })
    }

    pub fn global_filter(&self) -> String {
        self.read().global_filter.value().clone()
    }

    pub fn set_global_filter(&self, updater: impl Into<Updater<String>>) -> EventResult {
        let updater = updater.into();
        self.mutate(|inner| Some(inner.set_global_filter(updater)))
    }

    pub fn column_visibility(&self) -> VisibilityState {
        self.read().column_visibility.value().clone()
    }

    pub fn set_column_visibility(
        &self,
        updater: impl Into<Updater<VisibilityState>>,
    ) -> EventResult {
        let updater = updater.into();
        self.mutate(|inner| Some(inner.set_column_visibility(updater)))
    }

    pub fn row_selection(&self) -> RowSelection {
        self.read().row_selection.value().clone()
    }

    pub fn set_row_selection(&self, updater: impl Into<Updater<RowSelection>>) -> EventResult {
        let updater = updater.into();
        self.mutate(|inner| Some(inner.set_row_selection(updater)))
    }

    pub fn pagination(&self) -> PaginationState {
        *self.read().pagination.value()
    }

    /// Set pagination. The page index is clamped into `[0, page_count)`.
    pub fn set_pagination(&self, updater: impl Into<Updater<PaginationState>>) -> EventResult {
        let updater = updater.into();
        self.mutate(|inner| Some(inner.set_pagination(updater)))
    }

    // -------------------------------------------------------------------------
    // Sorting and visibility
    // -------------------------------------------------------------------------

    /// Cycle a column through ascending, descending and unsorted.
    ///
    /// Ignored for unknown and non-sortable columns.
    pub fn toggle_sort(&self, column_id: &str) -> EventResult {
        self.mutate(|inner| inner.toggle_sort(column_id))
    }

    pub fn sort_direction(&self, column_id: &str) -> Option<SortDirection> {
        self.read().sorting.value().direction(column_id)
    }

    /// Show or hide a hideable column.
    pub fn toggle_column_visibility(&self, column_id: &str) -> EventResult {
        self.mutate(|inner| inner.toggle_column_visibility(column_id))
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Rows of the current page.
    pub fn row_model(&self) -> RowModel<R> {
        let inner = self.read();
        let computed = inner.compute();
        let selection = inner.row_selection.value();
        let rows = inner
            .page_rows(&computed)
            .into_iter()
            .map(|row| RowView {
                selected: selection.is_selected(&row.id),
                original: inner.options.data[row.index].clone(),
                index: row.index,
                id: row.id,
            })
            .collect();
        RowModel {
            rows,
            filtered_count: computed.filtered_count,
            page_count: inner.page_count(&computed),
        }
    }

    pub fn page_count(&self) -> usize {
        let inner = self.read();
        inner.page_count(&inner.compute())
    }

    /// Toggle one row on the current page. Ignored when selection is off.
    pub fn toggle_row_selected(&self, row_id: &str) -> EventResult {
        self.mutate(|inner| inner.toggle_row_selected(row_id))
    }

    /// Select every row on the current page, or deselect them all when they
    /// are already all selected.
    pub fn toggle_all_page_rows_selected(&self) -> EventResult {
        self.mutate(EngineInner::toggle_all_page_rows_selected)
    }

    /// State of the header checkbox for the current page.
    pub fn select_all_state(&self) -> CheckState {
        let inner = self.read();
        let rows = inner.page_rows(&inner.compute());
        inner
            .row_selection
            .value()
            .check_state(rows.iter().map(|row| row.id.as_str()))
    }

    /// Selected rows.
    ///
    /// With a row id accessor this spans every row; otherwise only the current
    /// page can be resolved.
    pub fn selected_rows(&self) -> Vec<R> {
        let inner = self.read();
        let selection = inner.row_selection.value();
        let data = &inner.options.data;
        match &inner.options.get_row_id {
            Some(accessor) => data
                .iter()
                .filter(|row| selection.is_selected(&accessor.id(row)))
                .cloned()
                .collect(),
            None => inner
                .page_rows(&inner.compute())
                .into_iter()
                .filter(|row| selection.is_selected(&row.id))
                .map(|row| data[row.index].clone())
                .collect(),
        }
    }

    /// Forward a row click to the row click callback.
    pub fn click_row(&self, row_id: &str) -> EventResult {
        let effects = self.read().click_row(row_id);
        match effects {
            Some(effects) => {
                effects.run();
                EventResult::Consumed
            }
            None => EventResult::Ignored,
        }
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    pub fn pagination_controller(&self) -> PaginationController {
        let inner = self.read();
        inner.pagination_controller(&inner.compute())
    }

    fn paginate(
        &self,
        step: impl FnOnce(&PaginationController) -> Option<PaginationState>,
    ) -> EventResult {
        self.mutate(|inner| {
            let controller = inner.pagination_controller(&inner.compute());
            let next = step(&controller)?;
            Some(inner.set_pagination(Updater::Set(next)))
        })
    }

    /// Jump to a page, clamped into range.
    pub fn go_to_page(&self, page: i64) -> EventResult {
        self.paginate(|c| c.go_to_page(page))
    }

    pub fn next_page(&self) -> EventResult {
        self.paginate(PaginationController::next_page)
    }

    pub fn previous_page(&self) -> EventResult {
        self.paginate(PaginationController::previous_page)
    }

    pub fn first_page(&self) -> EventResult {
        self.paginate(PaginationController::first_page)
    }

    pub fn last_page(&self) -> EventResult {
        self.paginate(PaginationController::last_page)
    }

    /// Change the page size and return to the first page.
    pub fn set_page_size(&self, page_size: usize) -> EventResult {
        self.paginate(|c| c.set_page_size(page_size))
    }

    // -------------------------------------------------------------------------
    // Toolbar
    // -------------------------------------------------------------------------

    fn toolbar(&self) -> Arc<ToolbarController> {
        Arc::clone(&self.read().toolbar)
    }

    /// Type into the search box. The global filter follows after the
    /// debounce delay.
    pub fn search_input(&self, text: impl Into<String>) {
        self.toolbar().filter().input(text);
        self.mark_dirty();
    }

    /// Clear the search box and the global filter immediately.
    pub fn clear_search(&self) {
        self.toolbar().filter().clear();
        self.mark_dirty();
    }

    /// Text shown in the search box.
    pub fn search_text(&self) -> String {
        self.toolbar().filter().buffer()
    }

    /// Check if a search edit is waiting for its debounce delay.
    pub fn has_pending_search(&self) -> bool {
        self.toolbar().filter().has_pending()
    }

    pub fn activate_toolbar_action(&self, id: &str) -> EventResult {
        let actions = self.read().options.toolbar_actions.clone();
        if activate_action(&actions, id) {
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    // -------------------------------------------------------------------------
    // Export and view
    // -------------------------------------------------------------------------

    /// Export rows in the configured scope.
    ///
    /// Returns `None` when export is disabled or there are no rows.
    pub fn export(
        &self,
        format: ExportFormat,
        today: NaiveDate,
    ) -> Result<Option<ExportArtifact>, ExportError> {
        let (controller, rows) = {
            let inner = self.read();
            if !inner.options.enable_export {
                return Ok(None);
            }
            (inner.export_controller(), inner.export_rows())
        };
        controller.export(&rows, format, today)
    }

    /// Build the render snapshot.
    pub fn view(&self) -> TableView {
        self.read().view()
    }
}
