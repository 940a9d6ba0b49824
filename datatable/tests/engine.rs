use std::sync::{Arc, Mutex, OnceLock};

use datatable::prelude::*;
use serde_json::{Value, json};

fn people(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| json!({ "id": i, "name": format!("Person {i:02}"), "amount": i * 10 }))
        .collect()
}

fn columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::accessor("name", "Name"),
        ColumnDef::accessor("amount", "Amount"),
        ColumnDef::display("actions", "").hideable(false),
    ]
}

fn recorder<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(T) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |value: T| sink.lock().unwrap().push(value))
}

fn names(engine: &TableStateEngine<Value>) -> Vec<String> {
    engine
        .row_model()
        .rows
        .iter()
        .map(|row| row.original["name"].as_str().unwrap().to_string())
        .collect()
}

fn by_id(options: TableOptions<Value>) -> TableOptions<Value> {
    options.get_row_id(|row: &Value| row["id"].to_string())
}

// -----------------------------------------------------------------------------
// Controlled and uncontrolled slices
// -----------------------------------------------------------------------------

#[test]
fn test_controlled_sorting_renders_caller_value() {
    let (seen, on_change) = recorder();
    let options = TableOptions::new(columns(), people(3))
        .sorting(SortingState::by("name", SortDirection::Asc))
        .on_sorting_change(on_change);
    let engine = TableStateEngine::new(options.clone()).unwrap();

    assert_eq!(engine.toggle_sort("name"), EventResult::Consumed);

    // Forwarded, not applied.
    assert_eq!(
        *seen.lock().unwrap(),
        vec![SortingState::by("name", SortDirection::Desc)]
    );
    assert_eq!(engine.sort_direction("name"), Some(SortDirection::Asc));

    // The owner feeds the value back.
    engine
        .update(options.sorting(SortingState::by("name", SortDirection::Desc)))
        .unwrap();
    assert_eq!(engine.sort_direction("name"), Some(SortDirection::Desc));
    assert_eq!(names(&engine)[0], "Person 02");
}

#[test]
fn test_controlled_column_filters_forwarded() {
    let (seen, on_change) = recorder();
    let options = TableOptions::new(columns(), people(3))
        .column_filters(ColumnFilters::new())
        .on_column_filters_change(on_change);
    let engine = TableStateEngine::new(options).unwrap();

    engine.set_column_filter("name", "01");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get("name"), Some("01"));
    assert_eq!(engine.column_filters(), ColumnFilters::new());
    assert_eq!(engine.row_model().filtered_count, 3);
}

#[test]
fn test_controlled_visibility_forwarded() {
    let (seen, on_change) = recorder();
    let options = TableOptions::new(columns(), people(2))
        .column_visibility(VisibilityState::new())
        .on_column_visibility_change(on_change);
    let engine = TableStateEngine::new(options).unwrap();

    assert_eq!(engine.toggle_column_visibility("amount"), EventResult::Consumed);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(!seen[0].is_visible("amount"));
    assert!(engine.column_visibility().is_visible("amount"));
    let view = engine.view();
    let ids: Vec<&str> = view
        .ready()
        .unwrap()
        .headers
        .iter()
        .map(|h| h.column_id.as_str())
        .collect();
    assert_eq!(ids, vec!["name", "amount", "actions"]);
}

#[test]
fn test_controlled_row_selection_forwarded() {
    let (seen, on_change) = recorder();
    let options = by_id(
        TableOptions::new(columns(), people(3))
            .enable_row_selection(true)
            .row_selection(RowSelection::new())
            .on_row_selection_change(on_change),
    );
    let engine = TableStateEngine::new(options).unwrap();

    assert_eq!(engine.toggle_row_selected("1"), EventResult::Consumed);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].is_selected("1"));
    assert!(engine.row_selection().is_empty());
    assert!(!engine.row_model().rows[1].selected);
}

#[test]
fn test_uncontrolled_sorting_is_table_owned() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(3))).unwrap();

    engine.toggle_sort("amount");
    engine.toggle_sort("amount");

    assert_eq!(engine.sort_direction("amount"), Some(SortDirection::Desc));
    assert_eq!(names(&engine), vec!["Person 02", "Person 01", "Person 00"]);
}

#[test]
fn test_uncontrolled_callback_still_notified() {
    let (seen, on_change) = recorder();
    let engine = TableStateEngine::new(
        TableOptions::new(columns(), people(3)).on_sorting_change(on_change),
    )
    .unwrap();

    engine.toggle_sort("name");

    assert_eq!(engine.sort_direction("name"), Some(SortDirection::Asc));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_value_without_callback_seeds_uncontrolled() {
    let engine = TableStateEngine::new(
        TableOptions::new(columns(), people(3)).sorting(SortingState::by("name", SortDirection::Asc)),
    )
    .unwrap();

    engine.toggle_sort("name");

    assert_eq!(engine.sort_direction("name"), Some(SortDirection::Desc));
}

#[test]
fn test_updater_function_sees_current_value() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(3))).unwrap();
    engine.set_column_filter("name", "01");

    engine.set_column_filters(Updater::with(|filters: &ColumnFilters| {
        filters.with("amount", "10")
    }));

    let filters = engine.column_filters();
    assert_eq!(filters.get("name"), Some("01"));
    assert_eq!(filters.get("amount"), Some("10"));
}

#[test]
fn test_callback_may_reenter_engine() {
    let slot: Arc<OnceLock<TableStateEngine<Value>>> = Arc::new(OnceLock::new());
    let observed = Arc::new(Mutex::new(None));

    let engine_slot = Arc::clone(&slot);
    let sink = Arc::clone(&observed);
    let engine = TableStateEngine::new(
        TableOptions::new(columns(), people(3)).on_sorting_change(move |_| {
            let engine = engine_slot.get().unwrap();
            *sink.lock().unwrap() = engine.sort_direction("name");
        }),
    )
    .unwrap();
    slot.set(engine.clone()).unwrap();

    engine.toggle_sort("name");

    assert_eq!(*observed.lock().unwrap(), Some(SortDirection::Asc));
}

// -----------------------------------------------------------------------------
// Sorting
// -----------------------------------------------------------------------------

#[test]
fn test_sort_cycle() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(3))).unwrap();

    engine.toggle_sort("name");
    assert_eq!(engine.sort_direction("name"), Some(SortDirection::Asc));
    engine.toggle_sort("name");
    assert_eq!(engine.sort_direction("name"), Some(SortDirection::Desc));
    engine.toggle_sort("name");
    assert_eq!(engine.sort_direction("name"), None);
    assert!(engine.sorting().is_empty());
}

#[test]
fn test_sorting_new_column_resets_others() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(3))).unwrap();

    engine.toggle_sort("name");
    engine.toggle_sort("name");
    engine.toggle_sort("amount");

    assert_eq!(engine.sort_direction("name"), None);
    assert_eq!(engine.sort_direction("amount"), Some(SortDirection::Asc));
}

#[test]
fn test_non_sortable_columns_ignored() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(3))).unwrap();

    assert_eq!(engine.toggle_sort("actions"), EventResult::Ignored);
    assert_eq!(engine.toggle_sort("missing"), EventResult::Ignored);
    assert!(engine.sorting().is_empty());
}

#[test]
fn test_sort_header_reports_direction() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(3))).unwrap();
    engine.toggle_sort("amount");

    let view = engine.view();
    let ready = view.ready().unwrap();
    let amount = ready
        .headers
        .iter()
        .find(|h| h.column_id == "amount")
        .unwrap();
    assert_eq!(
        amount.kind,
        HeaderKind::Data {
            label: "Amount".into(),
            sortable: true,
            sort: Some(SortDirection::Asc),
        }
    );
}

// -----------------------------------------------------------------------------
// Selection
// -----------------------------------------------------------------------------

#[test]
fn test_select_all_tristate() {
    let engine = TableStateEngine::new(by_id(
        TableOptions::new(columns(), people(3)).enable_row_selection(true),
    ))
    .unwrap();

    assert_eq!(engine.select_all_state(), CheckState::Unchecked);

    engine.toggle_row_selected("1");
    assert_eq!(engine.select_all_state(), CheckState::Indeterminate);

    engine.toggle_all_page_rows_selected();
    assert_eq!(engine.select_all_state(), CheckState::Checked);
    assert_eq!(engine.selected_rows().len(), 3);

    engine.toggle_all_page_rows_selected();
    assert_eq!(engine.select_all_state(), CheckState::Unchecked);
    assert!(engine.selected_rows().is_empty());
}

#[test]
fn test_selection_disabled_ignores_toggles() {
    let engine = TableStateEngine::new(by_id(TableOptions::new(columns(), people(3)))).unwrap();

    assert_eq!(engine.toggle_row_selected("1"), EventResult::Ignored);
    assert_eq!(engine.toggle_all_page_rows_selected(), EventResult::Ignored);
    assert!(engine.row_selection().is_empty());
}

#[test]
fn test_selection_column_prepended() {
    let engine = TableStateEngine::new(by_id(
        TableOptions::new(columns(), people(2)).enable_row_selection(true),
    ))
    .unwrap();
    engine.toggle_row_selected("0");

    let view = engine.view();
    let ready = view.ready().unwrap();
    assert_eq!(ready.headers[0].column_id, "select");
    assert_eq!(ready.headers[0].kind, HeaderKind::SelectAll(CheckState::Indeterminate));

    let TableBody::Rows(rows) = &ready.body else {
        panic!("expected rows");
    };
    assert_eq!(rows[0].cells[0], BodyCell::Checkbox(true));
    assert_eq!(rows[1].cells[0], BodyCell::Checkbox(false));
}

#[test]
fn test_selection_by_row_id_survives_sorting() {
    let engine = TableStateEngine::new(by_id(
        TableOptions::new(columns(), people(3)).enable_row_selection(true),
    ))
    .unwrap();
    engine.toggle_row_selected("2");

    engine.toggle_sort("amount");
    engine.toggle_sort("amount");

    assert!(engine.row_selection().is_selected("2"));
    let first = &engine.row_model().rows[0];
    assert_eq!(first.id, "2");
    assert!(first.selected);
}

#[test]
fn test_positional_selection_cleared_on_sort() {
    let engine = TableStateEngine::new(
        TableOptions::new(columns(), people(3)).enable_row_selection(true),
    )
    .unwrap();
    engine.toggle_row_selected("0");
    assert!(!engine.row_selection().is_empty());

    engine.toggle_sort("amount");

    assert!(engine.row_selection().is_empty());
}

// -----------------------------------------------------------------------------
// Pagination
// -----------------------------------------------------------------------------

#[test]
fn test_client_pagination_pages_rows() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(25))).unwrap();

    assert_eq!(engine.mode(), ComputationMode::Client);
    assert_eq!(engine.page_count(), 3);
    assert_eq!(engine.row_model().rows.len(), 10);

    engine.last_page();
    let model = engine.row_model();
    assert_eq!(model.rows.len(), 5);
    assert_eq!(model.rows[0].original["name"], "Person 20");
    assert_eq!(engine.next_page(), EventResult::Ignored);
}

#[test]
fn test_set_page_size_resets_index() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(25))).unwrap();
    engine.go_to_page(2);
    assert_eq!(engine.pagination().page_index, 2);

    engine.set_page_size(20);

    assert_eq!(engine.pagination(), PaginationState::new(0, 20));
    assert_eq!(engine.page_count(), 2);
}

#[test]
fn test_filter_change_returns_to_first_page() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(25))).unwrap();
    engine.go_to_page(2);

    engine.set_global_filter("person 07");

    assert_eq!(engine.pagination().page_index, 0);
    assert_eq!(engine.row_model().filtered_count, 1);
}

#[test]
fn test_shrinking_data_clamps_page() {
    let options = TableOptions::new(columns(), people(25));
    let engine = TableStateEngine::new(options.clone()).unwrap();
    engine.last_page();

    engine
        .update(TableOptions::new(columns(), people(12)))
        .unwrap();

    let model = engine.row_model();
    assert_eq!(model.page_count, 2);
    assert_eq!(model.rows.len(), 2);
    assert_eq!(engine.pagination_controller().state().page_index, 1);
}

#[test]
fn test_page_size_and_index_set_together() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(25))).unwrap();

    engine.set_pagination(PaginationState::new(4, 5));

    assert_eq!(engine.pagination(), PaginationState::new(4, 5));
    let model = engine.row_model();
    assert_eq!(model.page_count, 5);
    assert_eq!(model.rows.len(), 5);
    assert_eq!(model.rows[0].original["name"], "Person 20");
}

#[test]
fn test_item_range_counts_filtered_rows() {
    let rows: Vec<Value> = (0..100)
        .map(|i| json!({ "name": format!("Person {i}") }))
        .collect();
    let options = TableOptions::new(vec![ColumnDef::accessor("name", "Name")], rows)
        .config(TableConfig::default().default_page_size(5));
    let engine = TableStateEngine::new(options).unwrap();

    engine.set_global_filter("person 1");
    engine.last_page();

    assert_eq!(engine.row_model().filtered_count, 19);
    let view = engine.view();
    let pagination = view.ready().unwrap().pagination.clone().unwrap();
    assert_eq!(pagination.label, "4 / 4");
    assert_eq!(pagination.item_range, Some((16, 19)));
    assert_eq!(pagination.total_items, Some(100));
}

#[test]
fn test_pagination_hidden_for_single_page() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(4))).unwrap();

    let view = engine.view();
    assert!(view.ready().unwrap().pagination.is_none());
}

// -----------------------------------------------------------------------------
// Server mode
// -----------------------------------------------------------------------------

fn server_engine() -> (TableStateEngine<Value>, Arc<Mutex<Vec<PaginationState>>>) {
    let (seen, on_change) = recorder();
    let options = TableOptions::new(columns(), people(2))
        .pagination(PaginationState::new(1, 2))
        .on_pagination_change(on_change)
        .page_count(3);
    (TableStateEngine::new(options).unwrap(), seen)
}

#[test]
fn test_server_mode_renders_rows_as_given() {
    let (engine, _) = server_engine();

    assert_eq!(engine.mode(), ComputationMode::Server);
    engine.toggle_sort("amount");
    engine.toggle_sort("amount");
    engine.set_global_filter("nobody");

    assert_eq!(names(&engine), vec!["Person 00", "Person 01"]);
    assert_eq!(engine.page_count(), 3);
}

#[test]
fn test_server_mode_does_not_slice_long_row_arrays() {
    let options = TableOptions::new(columns(), people(25))
        .pagination(PaginationState::new(0, 10))
        .on_pagination_change(|_| {})
        .page_count(3);
    let engine = TableStateEngine::new(options).unwrap();

    engine.toggle_sort("amount");
    engine.toggle_sort("amount");

    assert_eq!(engine.mode(), ComputationMode::Server);
    let expected: Vec<String> = (0..25).map(|i| format!("Person {i:02}")).collect();
    assert_eq!(names(&engine), expected);
}

#[test]
fn test_server_go_to_page_clamps() {
    let (engine, seen) = server_engine();

    engine.go_to_page(-5);
    engine.go_to_page(99);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![PaginationState::new(0, 2), PaginationState::new(2, 2)]
    );
    // Controlled: still showing the caller's page.
    assert_eq!(engine.pagination().page_index, 1);
}

#[test]
fn test_server_pagination_label() {
    let (engine, _) = server_engine();

    let view = engine.view();
    let pagination = view.ready().unwrap().pagination.clone().unwrap();
    assert_eq!(pagination.label, "2 / 3");
    assert!(pagination.can_previous);
    assert!(pagination.can_next);
    assert_eq!(pagination.total_items, None);
}

#[test]
fn test_server_zero_page_count_suppresses_pagination() {
    let options = TableOptions::new(columns(), people(2))
        .on_pagination_change(|_| {})
        .page_count(0);
    let engine = TableStateEngine::new(options).unwrap();

    assert_eq!(engine.mode(), ComputationMode::Server);
    assert_eq!(engine.next_page(), EventResult::Ignored);
    assert!(engine.view().ready().unwrap().pagination.is_none());
}

#[test]
fn test_callback_without_signal_stays_client() {
    let options = TableOptions::new(columns(), people(25)).on_pagination_change(|_| {});
    let engine = TableStateEngine::new(options).unwrap();

    assert_eq!(engine.mode(), ComputationMode::Client);
    assert_eq!(engine.row_model().rows.len(), 10);
}

// -----------------------------------------------------------------------------
// Rows, visibility and rendering
// -----------------------------------------------------------------------------

#[test]
fn test_row_click_forwards_original_row() {
    let (seen, on_click) = recorder();
    let engine = TableStateEngine::new(by_id(
        TableOptions::new(columns(), people(3)).on_row_click(on_click),
    ))
    .unwrap();

    assert_eq!(engine.click_row("1"), EventResult::Consumed);
    assert_eq!(engine.click_row("42"), EventResult::Ignored);
    assert_eq!(seen.lock().unwrap()[0]["name"], "Person 01");
}

#[test]
fn test_row_click_without_callback_ignored() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(3))).unwrap();

    assert_eq!(engine.click_row("0"), EventResult::Ignored);
    let view = engine.view();
    let TableBody::Rows(rows) = &view.ready().unwrap().body else {
        panic!("expected rows");
    };
    assert!(!rows[0].clickable);
}

#[test]
fn test_hiding_column_removes_it_from_view() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(2))).unwrap();

    assert_eq!(engine.toggle_column_visibility("amount"), EventResult::Consumed);
    assert_eq!(engine.toggle_column_visibility("actions"), EventResult::Ignored);

    let view = engine.view();
    let ready = view.ready().unwrap();
    let ids: Vec<&str> = ready.headers.iter().map(|h| h.column_id.as_str()).collect();
    assert_eq!(ids, vec!["name", "actions"]);

    let toggles = &ready.toolbar.column_toggles;
    assert_eq!(toggles.len(), 2);
    assert!(!toggles.iter().find(|t| t.id == "amount").unwrap().visible);
}

#[test]
fn test_empty_body_spans_columns() {
    let engine = TableStateEngine::new(
        TableOptions::new(columns(), Vec::<Value>::new())
            .enable_row_selection(true)
            .empty_message("Nothing here"),
    )
    .unwrap();

    let view = engine.view();
    assert_eq!(
        view.ready().unwrap().body,
        TableBody::Empty {
            message: "Nothing here".into(),
            colspan: 4,
        }
    );
}

#[test]
fn test_loading_renders_skeleton() {
    let engine = TableStateEngine::new(
        TableOptions::new(columns(), people(3))
            .enable_row_selection(true)
            .loading(true),
    )
    .unwrap();

    assert_eq!(
        engine.view(),
        TableView::Loading(datatable::engine::SkeletonView { columns: 4, rows: 10 })
    );
}

#[test]
fn test_mobile_cards_need_renderer() {
    let options = TableOptions::new(columns(), people(2)).enable_mobile_card(true);
    let engine = TableStateEngine::new(options.clone()).unwrap();
    assert!(engine.view().ready().unwrap().cards.is_none());

    engine
        .update(options.mobile_card(|row: &Value| row["name"].as_str().unwrap().to_uppercase()))
        .unwrap();
    let view = engine.view();
    let cards = view.ready().unwrap().cards.clone().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].content, "PERSON 00");
    assert!(!cards[0].show_checkbox);
}

#[test]
fn test_duplicate_column_ids_rejected() {
    let columns = vec![
        ColumnDef::accessor("name", "Name"),
        ColumnDef::accessor("name", "Again"),
    ];

    let err = TableStateEngine::new(TableOptions::new(columns, people(1))).unwrap_err();
    assert_eq!(err, TableError::DuplicateColumnId("name".into()));
}

#[test]
fn test_dirty_flag_tracks_changes() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(3))).unwrap();
    assert!(engine.is_dirty());
    engine.clear_dirty();

    engine.toggle_sort("actions");
    assert!(!engine.is_dirty());

    engine.toggle_sort("name");
    assert!(engine.is_dirty());
}

// -----------------------------------------------------------------------------
// Toolbar and export
// -----------------------------------------------------------------------------

#[test]
fn test_toolbar_action_invoked() {
    let (seen, on_activate) = recorder();
    let engine = TableStateEngine::new(
        TableOptions::new(columns(), people(1))
            .toolbar_action(ToolbarAction::new("add", "Add row").on_activate(on_activate)),
    )
    .unwrap();

    assert_eq!(engine.activate_toolbar_action("add"), EventResult::Consumed);
    assert_eq!(engine.activate_toolbar_action("nope"), EventResult::Ignored);
    assert_eq!(seen.lock().unwrap().len(), 1);

    let view = engine.view();
    assert_eq!(
        view.ready().unwrap().toolbar.actions,
        vec![("add".to_string(), "Add row".to_string())]
    );
}

#[test]
fn test_empty_export_renders_no_trigger() {
    let engine = TableStateEngine::new(
        TableOptions::new(columns(), Vec::<Value>::new()).enable_export(true),
    )
    .unwrap();
    let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    assert!(!engine.view().ready().unwrap().toolbar.export_available);
    assert!(engine.export(ExportFormat::Csv, today).unwrap().is_none());
}

#[test]
fn test_export_disabled_returns_none() {
    let engine = TableStateEngine::new(TableOptions::new(columns(), people(3))).unwrap();
    let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    assert!(!engine.view().ready().unwrap().toolbar.export_available);
    assert!(engine.export(ExportFormat::Csv, today).unwrap().is_none());
}

#[test]
fn test_export_scope_current_page() {
    let engine = TableStateEngine::new(
        TableOptions::new(columns(), people(25))
            .enable_export(true)
            .export_scope(ExportScope::CurrentPage)
            .export_file_name("people"),
    )
    .unwrap();
    engine.last_page();
    let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    let artifact = engine.export(ExportFormat::Csv, today).unwrap().unwrap();

    assert_eq!(artifact.file_name, "people_20261018.csv");
    let text = String::from_utf8(artifact.bytes).unwrap();
    // Header plus five rows.
    assert_eq!(text.trim_end().lines().count(), 6);
}

#[test]
fn test_column_toggle_can_be_disabled() {
    let engine = TableStateEngine::new(
        TableOptions::new(columns(), people(2)).enable_column_toggle(false),
    )
    .unwrap();

    let view = engine.view();
    let toolbar = &view.ready().unwrap().toolbar;
    assert!(toolbar.column_toggles.is_empty());
    assert_eq!(toolbar.search_placeholder, "Search...");
}
