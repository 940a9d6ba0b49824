//! Engine state behind the lock.
//!
//! Mutations return [`Effects`]: callbacks collected while the lock is held
//! and run by the handle after it is released.

use std::sync::Arc;

use crate::callback::Updater;
use crate::column::{Column, ColumnModel, compose_columns};
use crate::export::{CsvWriter, ExportController, ExportScope};
use crate::pagination::PaginationController;
use crate::row::{TableRow, resolve_row_id};
use crate::row_model::{ComputeRequest, ComputedRows};
use crate::selection::{CheckState, RowSelection};
use crate::slice::{Notify, Slice};
use crate::sorting::SortingState;
use crate::state::{ColumnFilters, PaginationState, VisibilityState};
use crate::toolbar::ToolbarController;

use super::options::{ComputationMode, TableOptions};
use super::view::{
    BodyCell, BodyRow, CardView, HeaderCell, HeaderKind, ReadyView, SkeletonView, TableBody,
    TableView,
};

/// Deferred callback invocations.
#[derive(Default)]
pub(super) struct Effects(Vec<Box<dyn FnOnce() + Send>>);

impl Effects {
    fn notify<T: Send + 'static>(&mut self, notify: Option<Notify<T>>) {
        if let Some(notify) = notify {
            self.0.push(Box::new(move || notify.fire()));
        }
    }

    fn push(&mut self, f: impl FnOnce() + Send + 'static) {
        self.0.push(Box::new(f));
    }

    pub(super) fn run(self) {
        for f in self.0 {
            f();
        }
    }
}

/// A row on the current page.
pub(super) struct PageRow {
    /// Index into the raw rows.
    pub index: usize,
    pub id: String,
}

pub(super) struct EngineInner<R: TableRow> {
    pub options: TableOptions<R>,
    pub sorting: Slice<SortingState>,
    pub column_filters: Slice<ColumnFilters>,
    pub global_filter: Slice<String>,
    pub column_visibility: Slice<VisibilityState>,
    pub row_selection: Slice<RowSelection>,
    pub pagination: Slice<PaginationState>,
    pub toolbar: Arc<ToolbarController>,
}

impl<R: TableRow> EngineInner<R> {
    pub fn new(options: TableOptions<R>, toolbar: Arc<ToolbarController>) -> Self {
        let page_size = options.config.default_page_size;
        Self {
            sorting: Slice::new("sorting", SortingState::none(), options.sorting.source("sorting")),
            column_filters: Slice::new(
                "column_filters",
                ColumnFilters::new(),
                options.column_filters.source("column_filters"),
            ),
            global_filter: Slice::new(
                "global_filter",
                String::new(),
                options.global_filter.source("global_filter"),
            ),
            column_visibility: Slice::new(
                "column_visibility",
                VisibilityState::new(),
                options.column_visibility.source("column_visibility"),
            ),
            row_selection: Slice::new(
                "row_selection",
                RowSelection::new(),
                options.row_selection.source("row_selection"),
            ),
            pagination: Slice::new(
                "pagination",
                PaginationState::first(page_size),
                options.pagination.source("pagination"),
            ),
            options,
            toolbar,
        }
    }

    /// Take new options, keeping uncontrolled state.
    pub fn resync(&mut self, options: TableOptions<R>) {
        self.sorting.resync(options.sorting.source("sorting"));
        self.column_filters
            .resync(options.column_filters.source("column_filters"));
        self.global_filter
            .resync(options.global_filter.source("global_filter"));
        self.column_visibility
            .resync(options.column_visibility.source("column_visibility"));
        self.row_selection
            .resync(options.row_selection.source("row_selection"));
        self.pagination.resync(options.pagination.source("pagination"));
        self.options = options;
        self.toolbar.filter().sync_external(self.global_filter.value());
    }

    pub fn mode(&self) -> ComputationMode {
        self.options.computation_mode()
    }

    // -------------------------------------------------------------------------
    // Row model
    // -------------------------------------------------------------------------

    fn compute_with(&self, pagination: PaginationState) -> ComputedRows {
        let request = ComputeRequest {
            columns: &self.options.columns,
            sorting: self.sorting.value(),
            column_filters: self.column_filters.value(),
            global_filter: self.global_filter.value(),
            pagination,
        };
        self.options.computation.compute(&self.options.data, &request)
    }

    /// Current page of rows. Server mode passes rows through untouched.
    pub fn compute(&self) -> ComputedRows {
        let data_len = self.options.data.len();
        match self.mode() {
            ComputationMode::Server => ComputedRows {
                page: (0..data_len).collect(),
                filtered_count: data_len,
            },
            ComputationMode::Client => {
                let pagination = *self.pagination.value();
                let computed = self.compute_with(pagination);
                let count = pagination.page_count_for(computed.filtered_count);
                if count > 0 && pagination.page_index >= count {
                    // Rows shrank under the current page.
                    self.compute_with(pagination.clamped(count))
                } else {
                    computed
                }
            }
        }
    }

    pub fn page_count(&self, computed: &ComputedRows) -> usize {
        match self.mode() {
            ComputationMode::Server => self.options.page_count.unwrap_or(0).max(0) as usize,
            ComputationMode::Client => self
                .pagination
                .value()
                .page_count_for(computed.filtered_count),
        }
    }

    pub fn page_rows(&self, computed: &ComputedRows) -> Vec<PageRow> {
        let accessor = self.options.get_row_id.as_ref();
        computed
            .page
            .iter()
            .enumerate()
            .map(|(pos, &index)| PageRow {
                index,
                id: resolve_row_id(accessor, &self.options.data[index], pos),
            })
            .collect()
    }

    pub fn pagination_controller(&self, computed: &ComputedRows) -> PaginationController {
        let page_count = self.page_count(computed);
        let mut state = *self.pagination.value();
        if page_count > 0 {
            state = state.clamped(page_count);
        }
        let controller = match self.mode() {
            ComputationMode::Client => {
                PaginationController::new(state, page_count, Some(self.options.data.len()))
                    .with_filtered_items(computed.filtered_count)
            }
            ComputationMode::Server => PaginationController::new(state, page_count, None),
        };
        controller.with_page_size_options(self.options.config.page_size_options.clone())
    }

    pub fn rendered_columns(&self) -> Vec<Column> {
        let visibility = self.column_visibility.value();
        compose_columns(&self.options.columns, self.options.enable_row_selection)
            .into_iter()
            .filter(|col| col.is_structural() || visibility.is_visible(col.id()))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Slice mutation
    // -------------------------------------------------------------------------

    /// Rows were re-ordered or re-filtered: return to the first page in client
    /// mode and drop selection that is keyed by page position.
    fn rows_moved(&mut self, effects: &mut Effects) {
        if self.mode() == ComputationMode::Client && self.pagination.value().page_index != 0 {
            let (_, notify) = self
                .pagination
                .apply(Updater::with(|p: &PaginationState| PaginationState::first(p.page_size)));
            effects.notify(notify);
        }
        self.clear_positional_selection(effects);
    }

    fn clear_positional_selection(&mut self, effects: &mut Effects) {
        if self.options.get_row_id.is_some() || self.row_selection.value().is_empty() {
            return;
        }
        log::debug!("row_selection: clearing position-keyed selection after rows moved");
        let (_, notify) = self.row_selection.apply(Updater::Set(RowSelection::new()));
        effects.notify(notify);
    }

    pub fn set_sorting(&mut self, updater: Updater<SortingState>) -> Effects {
        let mut effects = Effects::default();
        let before = self.sorting.value().clone();
        let (next, notify) = self.sorting.apply(updater);
        effects.notify(notify);
        if next != before {
            self.rows_moved(&mut effects);
        }
        effects
    }

    pub fn set_column_filters(&mut self, updater: Updater<ColumnFilters>) -> Effects {
        let mut effects = Effects::default();
        let before = self.column_filters.value().clone();
        let (next, notify) = self.column_filters.apply(updater);
        effects.notify(notify);
        if next != before {
            self.rows_moved(&mut effects);
        }
        effects
    }

    pub fn set_global_filter(&mut self, updater: Updater<String>) -> Effects {
        let mut effects = Effects::default();
        let before = self.global_filter.value().clone();
        let (next, notify) = self.global_filter.apply(updater);
        effects.notify(notify);
        if !self.global_filter.is_controlled() {
            self.toolbar.filter().sync_external(&next);
        }
        if next != before {
            self.rows_moved(&mut effects);
        }
        effects
    }

    pub fn set_column_visibility(&mut self, updater: Updater<VisibilityState>) -> Effects {
        let mut effects = Effects::default();
        let (_, notify) = self.column_visibility.apply(updater);
        effects.notify(notify);
        effects
    }

    pub fn set_row_selection(&mut self, updater: Updater<RowSelection>) -> Effects {
        let mut effects = Effects::default();
        let (_, notify) = self.row_selection.apply(updater);
        effects.notify(notify);
        effects
    }

    /// Apply a pagination change, clamping the index into `[0, page_count)`
    /// for the requested page size.
    pub fn set_pagination(&mut self, updater: Updater<PaginationState>) -> Effects {
        let mut effects = Effects::default();
        let computed = self.compute();
        // Server page counts are fixed by the caller; client ones follow the size.
        let server_page_count = match self.mode() {
            ComputationMode::Server => Some(self.page_count(&computed)),
            ComputationMode::Client => None,
        };
        let filtered_count = computed.filtered_count;
        let before = *self.pagination.value();
        let (next, notify) = self.pagination.apply(Updater::with(move |current| {
            let requested = updater.apply(current);
            let page_count =
                server_page_count.unwrap_or_else(|| requested.page_count_for(filtered_count));
            let next = requested.clamped(page_count);
            if next != requested {
                log::debug!("pagination: clamped {:?} to {:?}", requested, next);
            }
            next
        }));
        effects.notify(notify);
        if next != before {
            self.clear_positional_selection(&mut effects);
        }
        effects
    }

    // -------------------------------------------------------------------------
    // Interactions
    // -------------------------------------------------------------------------

    pub fn toggle_sort(&mut self, column_id: &str) -> Option<Effects> {
        let sortable = self
            .options
            .columns
            .iter()
            .any(|col| col.id == column_id && col.can_sort());
        if !sortable {
            return None;
        }
        let next = self.sorting.value().toggled(column_id);
        log::debug!("sorting: {} -> {:?}", column_id, next.direction(column_id));
        Some(self.set_sorting(Updater::Set(next)))
    }

    pub fn toggle_column_visibility(&mut self, column_id: &str) -> Option<Effects> {
        let hideable = self
            .options
            .columns
            .iter()
            .any(|col| col.id == column_id && col.hideable);
        if !hideable {
            return None;
        }
        let next = self.column_visibility.value().toggled(column_id);
        Some(self.set_column_visibility(Updater::Set(next)))
    }

    pub fn toggle_row_selected(&mut self, row_id: &str) -> Option<Effects> {
        if !self.options.enable_row_selection {
            return None;
        }
        let computed = self.compute();
        if !self.page_rows(&computed).iter().any(|row| row.id == row_id) {
            return None;
        }
        let next = self.row_selection.value().toggled(row_id);
        Some(self.set_row_selection(Updater::Set(next)))
    }

    /// Select every row on the current page, or clear them all when they are
    /// already all selected.
    pub fn toggle_all_page_rows_selected(&mut self) -> Option<Effects> {
        if !self.options.enable_row_selection {
            return None;
        }
        let computed = self.compute();
        let rows = self.page_rows(&computed);
        if rows.is_empty() {
            return None;
        }
        let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        let current = self.row_selection.value();
        let select = current.check_state(ids.iter().copied()) != CheckState::Checked;
        let next = current.with_all(ids.iter().copied(), select);
        Some(self.set_row_selection(Updater::Set(next)))
    }

    pub fn click_row(&self, row_id: &str) -> Option<Effects> {
        let on_click = self.options.on_row_click.clone()?;
        let computed = self.compute();
        let row = self
            .page_rows(&computed)
            .into_iter()
            .find(|row| row.id == row_id)?;
        let original = self.options.data[row.index].clone();
        let mut effects = Effects::default();
        effects.push(move || on_click.call(original));
        Some(effects)
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    pub fn export_controller(&self) -> ExportController {
        let config = &self.options.config;
        ExportController::new(
            ColumnModel::derive(&self.options.columns).export_columns,
            config.export_file_name.clone(),
        )
        .with_csv(CsvWriter::with_delimiter(config.csv_delimiter))
    }

    pub fn export_rows(&self) -> Vec<R> {
        let data = &self.options.data;
        match self.options.export_scope {
            ExportScope::AllRows => data.clone(),
            ExportScope::CurrentPage => self
                .compute()
                .page
                .into_iter()
                .map(|i| data[i].clone())
                .collect(),
            ExportScope::FilteredRows => match self.mode() {
                ComputationMode::Server => data.clone(),
                ComputationMode::Client => self
                    .compute_with(PaginationState::new(0, usize::MAX))
                    .page
                    .into_iter()
                    .map(|i| data[i].clone())
                    .collect(),
            },
        }
    }

    // -------------------------------------------------------------------------
    // View
    // -------------------------------------------------------------------------

    pub fn view(&self) -> TableView {
        let options = &self.options;
        if options.loading {
            return TableView::Loading(SkeletonView {
                columns: options.columns.len() + usize::from(options.enable_row_selection),
                rows: self.pagination.value().page_size,
            });
        }

        let computed = self.compute();
        let rows = self.page_rows(&computed);
        let columns = self.rendered_columns();
        let selection = self.row_selection.value();

        let headers = columns
            .iter()
            .map(|col| HeaderCell {
                column_id: col.id().to_string(),
                kind: match col {
                    Column::Selection => {
                        HeaderKind::SelectAll(selection.check_state(rows.iter().map(|r| r.id.as_str())))
                    }
                    Column::Data(def) => HeaderKind::Data {
                        label: def.header.render(),
                        sortable: def.can_sort(),
                        sort: self.sorting.value().direction(&def.id),
                    },
                },
            })
            .collect();

        let body = if rows.is_empty() {
            TableBody::Empty {
                message: options.config.empty_message.clone(),
                colspan: columns.len(),
            }
        } else {
            TableBody::Rows(
                rows.iter()
                    .map(|row| {
                        let data = &options.data[row.index];
                        let selected = selection.is_selected(&row.id);
                        BodyRow {
                            id: row.id.clone(),
                            selected,
                            clickable: options.on_row_click.is_some(),
                            cells: columns
                                .iter()
                                .map(|col| match col {
                                    Column::Selection => BodyCell::Checkbox(selected),
                                    Column::Data(def) => BodyCell::Value(
                                        def.accessor
                                            .as_deref()
                                            .map(|a| data.cell(a))
                                            .unwrap_or_default(),
                                    ),
                                })
                                .collect(),
                        }
                    })
                    .collect(),
            )
        };

        let cards = match (&options.mobile_card, options.enable_mobile_card) {
            (Some(renderer), true) => Some(
                rows.iter()
                    .map(|row| CardView {
                        id: row.id.clone(),
                        selected: selection.is_selected(&row.id),
                        show_checkbox: options.enable_row_selection,
                        content: renderer.render(&options.data[row.index]),
                    })
                    .collect(),
            ),
            _ => None,
        };

        let export_available = options.enable_export
            && self
                .export_controller()
                .is_available(self.export_rows().len());
        let toggle_options = if options.enable_column_toggle {
            ColumnModel::derive(&options.columns).toggle_options
        } else {
            Vec::new()
        };
        let toolbar = self.toolbar.view(
            self.column_visibility.value(),
            &toggle_options,
            &options.toolbar_actions,
            export_available,
        );

        TableView::Ready(Box::new(ReadyView {
            toolbar,
            headers,
            body,
            cards,
            pagination: self.pagination_controller(&computed).view(),
        }))
    }
}
