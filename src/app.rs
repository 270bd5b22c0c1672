use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::*;
use rfd::FileDialog;

use crate::domain::entities::cell::{CellKey, ModificationStatus};
use crate::domain::entities::record::CellValue;
use crate::domain::entities::table::{ColumnType, NewColumn, TableId};
use crate::infra::sqlite::backend::SqliteBackend;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::components::header::HeaderRow;
use crate::ui::components::row::RowView;
use crate::ui::display::{ColumnGeometry, KeyOutcome};
use crate::ui::keyboard::{KeyPress, KeyRegistry};
use crate::ui::selector::{RecordSelector, SelectorCandidate};
use crate::ui::state::grid_state::GridState;
use crate::ui::style::{
    context_menu_style, grid_container_style, modal_overlay_style, modal_panel_style, root_style,
    toolbar_style,
};
use crate::usecase::ports::backend::{NewTable, RecordsBackend};
use crate::usecase::services::import_service::ImportService;
use crate::usecase::services::record_store::{CommitOutcome, RecordStore, StoreEvent};
use crate::usecase::services::table_service::TableService;
use crate::{default_db_path, COLUMN_WIDTH, GRID_VIEWPORT_WIDTH, GUTTER_WIDTH};

const NONE_OPTION_VALUE: &str = "__none__";
const SELECTOR_LIMIT: i64 = 50;

#[derive(Clone, Debug, PartialEq)]
struct DropdownOption {
    value: String,
    label: String,
}

fn dropdown_label(options: &[DropdownOption], selected: Option<&str>) -> String {
    selected
        .and_then(|value| options.iter().find(|opt| opt.value == value))
        .map(|opt| opt.label.clone())
        .unwrap_or_else(|| "(none)".to_string())
}

#[component]
fn TableDropdown(
    label: &'static str,
    options: Vec<DropdownOption>,
    selected: Option<String>,
    mut open: Signal<bool>,
    mut dropdown_pos: Signal<Option<(f64, f64)>>,
    on_select: EventHandler<String>,
) -> Element {
    let is_open = open();
    let selected_label = dropdown_label(&options, selected.as_deref());
    let (left, top) = dropdown_pos().unwrap_or((0.0, 0.0));

    rsx! {
        div {
            style: "position: relative; display: inline-flex; align-items: center; gap: 6px;",
            span { "{label}" }
            button {
                style: "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                onclick: move |event| {
                    event.stop_propagation();
                    if open() {
                        open.set(false);
                        return;
                    }
                    let point = event.client_coordinates();
                    dropdown_pos.set(Some((point.x, point.y + 24.0)));
                    open.set(true);
                },
                "{selected_label}"
            }
        }

        if is_open {
            div {
                style: "position: fixed; left: {left}px; top: {top}px; min-width: 200px; max-height: 320px; overflow-y: auto; background: #fff; border: 1px solid #bbb; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1200;",
                onclick: move |event| event.stop_propagation(),
                {options.iter().map(|opt| {
                    let value = opt.value.clone();
                    let option_label = opt.label.clone();
                    let is_selected = selected.as_deref() == Some(value.as_str());
                    let background = if is_selected { "#eef4ff" } else { "transparent" };
                    rsx!(
                        div {
                            style: "padding: 8px 10px; cursor: pointer; background: {background};",
                            onclick: move |_| {
                                on_select.call(value.clone());
                                open.set(false);
                            },
                            "{option_label}"
                        }
                    )
                })}
            }
        }
    }
}

#[component]
pub fn App() -> Element {
    let db_path = match default_db_path() {
        Ok(path) => path,
        Err(err) => {
            return rsx! {
                div {
                    p { "failed to resolve database path: {err}" }
                }
            };
        }
    };

    let GridState {
        mut tables,
        mut selected_table,
        mut columns,
        mut rows,
        mut statuses,
        mut client_errors,
        mut display,
        mut editing_cell,
        mut editing_value,
        mut selected_rows,
        mut busy,
        mut status_line,
        mut context_menu,
        mut context_cell,
        mut show_selector,
        mut selector,
        mut selector_query,
        mut show_add_column,
        mut new_column_name,
        mut new_column_type,
        mut new_column_nullable,
    } = GridState::new();

    let mut table_dropdown_open = use_signal(|| false);
    let table_dropdown_pos = use_signal(|| None::<(f64, f64)>);

    let backend: Arc<dyn RecordsBackend> = use_hook({
        let db_path = db_path.clone();
        move || Arc::new(SqliteBackend::new(db_path)) as Arc<dyn RecordsBackend>
    });
    let table_service = use_hook({
        let backend = backend.clone();
        move || Arc::new(TableService::new(backend))
    });
    let import_service = use_hook({
        let db_path = db_path.clone();
        move || Arc::new(ImportService::new(db_path))
    });
    let store = use_hook({
        let backend = backend.clone();
        move || Rc::new(RecordStore::new(backend))
    });
    let registry = use_hook(KeyRegistry::new);

    let subscription = use_hook({
        let store = store.clone();
        move || {
            store.subscribe(move |store, event| {
                let mut columns = columns;
                let mut rows = rows;
                let mut statuses = statuses;
                let mut display = display;
                match event {
                    StoreEvent::Loaded | StoreEvent::RowsChanged => {
                        let loaded_columns = store.columns();
                        let geometry =
                            ColumnGeometry::uniform(loaded_columns.len(), COLUMN_WIDTH);
                        display.write().set_grid(store.rows().len(), geometry);
                        columns.set(loaded_columns);
                        rows.set(store.rows());
                        statuses.set(store.statuses());
                    }
                    StoreEvent::CellStatus { .. } => {
                        statuses.set(store.statuses());
                    }
                }
            })
        }
    });
    use_drop({
        let store = store.clone();
        move || store.unsubscribe(subscription)
    });

    let backend_for_init = backend.clone();
    let table_service_for_init = table_service.clone();
    let store_for_init = store.clone();
    use_effect(move || {
        display
            .write()
            .set_viewport_width(GRID_VIEWPORT_WIDTH - GUTTER_WIDTH);
        *busy.write() = true;
        let init_result = run_blocking(|| {
            backend_for_init
                .init()
                .and_then(|_| table_service_for_init.list_tables())
        });
        match init_result {
            Ok(available) => {
                let first = available.first().map(|table| table.id);
                *tables.write() = available;
                *selected_table.write() = first.map(|id| id.0);
                if let Some(table) = first {
                    match run_blocking(|| store_for_init.open_table(table)) {
                        Ok(()) => *status_line.write() = "Loaded table".to_string(),
                        Err(err) => {
                            *status_line.write() = format!("failed to load table: {err}")
                        }
                    }
                } else {
                    *status_line.write() =
                        "No tables yet; import a CSV or create one".to_string();
                }
            }
            Err(err) => {
                *status_line.write() = format!("failed to initialize backend: {err}");
            }
        }
        *busy.write() = false;
    });

    let open_table = Rc::new(RefCell::new({
        let store = store.clone();
        move |next: Option<i64>| {
            *selected_table.write() = next;
            editing_cell.set(None);
            editing_value.set(String::new());
            client_errors.write().clear();
            selected_rows.write().clear();
            context_menu.set(None);
            context_cell.set(None);
            *busy.write() = true;
            if let Some(id) = next {
                match run_blocking(|| store.open_table(TableId(id))) {
                    Ok(()) => *status_line.write() = "Loaded table".to_string(),
                    Err(err) => *status_line.write() = format!("failed to load table: {err}"),
                }
            } else {
                columns.set(Vec::new());
                rows.set(Vec::new());
                statuses.set(HashMap::new());
                display
                    .write()
                    .set_grid(0, ColumnGeometry::uniform(0, COLUMN_WIDTH));
            }
            *busy.write() = false;
        }
    }));

    let refresh_tables = Rc::new(RefCell::new({
        let table_service = table_service.clone();
        move || match run_blocking(|| table_service.list_tables()) {
            Ok(available) => *tables.write() = available,
            Err(err) => *status_line.write() = format!("failed to refresh tables: {err}"),
        }
    }));

    let start_editing = Rc::new(RefCell::new({
        let store = store.clone();
        move |row_idx: usize, column_idx: usize| {
            let columns_snapshot = columns();
            let Some(column) = columns_snapshot.get(column_idx) else {
                return;
            };
            let Some(row) = rows().get(row_idx).cloned() else {
                return;
            };
            if column.primary_key && !row.is_new {
                *status_line.write() = "primary key columns are read-only".to_string();
                return;
            }
            if column.column_type == ColumnType::Boolean {
                return;
            }
            let key = CellKey::new(row_idx, column.id);
            let seed = store.display_value(key).edit_text();
            display.write().select_cell(row_idx, column_idx);
            editing_cell.set(Some(key));
            editing_value.set(seed);
        }
    }));

    let commit_cell = Rc::new(RefCell::new({
        let store = store.clone();
        move |row_idx: usize, column_idx: usize, value: CellValue| {
            let columns_snapshot = columns();
            let Some(column) = columns_snapshot.get(column_idx) else {
                return;
            };
            let key = CellKey::new(row_idx, column.id);
            // The value parsed, so any client-side error for this key is
            // obsolete regardless of how the commit resolves.
            client_errors.write().remove(&key);
            *busy.write() = true;
            let outcome = run_blocking(|| store.create_or_update_record(key, value));
            match outcome {
                CommitOutcome::Committed => {
                    *status_line.write() = "Saved".to_string();
                }
                CommitOutcome::Unchanged => {}
                CommitOutcome::Rejected => {
                    *status_line.write() =
                        "Validation failed; see the cell for details".to_string();
                }
                CommitOutcome::Failed(message) => {
                    *status_line.write() = format!("save failed: {message}");
                }
                CommitOutcome::Stale => {}
            }
            *busy.write() = false;
        }
    }));

    let end_editing = Rc::new(RefCell::new(move |key: KeyPress| match key {
        KeyPress::Enter => {
            editing_cell.set(None);
            editing_value.set(String::new());
            let _ = display.write().handle_key_on_active_cell(KeyPress::ArrowDown);
        }
        KeyPress::Tab => {
            editing_cell.set(None);
            editing_value.set(String::new());
            let _ = display.write().handle_key_on_active_cell(KeyPress::Tab);
        }
        KeyPress::Escape => {
            if let Some(cell) = editing_cell() {
                client_errors.write().remove(&cell);
            }
            editing_cell.set(None);
            editing_value.set(String::new());
        }
        _ => {}
    }));

    let run_search = Rc::new(RefCell::new({
        let table_service = table_service.clone();
        move |term: String| {
            selector_query.set(term.clone());
            let Some(table) = selected_table() else {
                return;
            };
            match run_blocking(|| {
                table_service.search_records(TableId(table), &term, SELECTOR_LIMIT)
            }) {
                Ok(records) => {
                    let columns_snapshot = columns();
                    let candidates = records
                        .iter()
                        .map(|(record_id, record)| SelectorCandidate {
                            record_id: *record_id,
                            summary: summarize_record(&columns_snapshot, record),
                        })
                        .collect();
                    selector.write().set_candidates(candidates);
                }
                Err(err) => {
                    *status_line.write() = format!("search failed: {err}");
                }
            }
        }
    }));

    let columns_snapshot = columns();
    let rows_snapshot = rows();
    let statuses_snapshot = statuses();
    let client_errors_snapshot = client_errors();
    let selected_rows_snapshot = selected_rows();
    let display_snapshot = display();
    let active = display_snapshot.active_cell();
    let editing_snapshot = editing_cell();
    let scroll_x = display_snapshot.scroll_x();
    let content_width = display_snapshot.geometry().total_width();
    let table_options = std::iter::once(DropdownOption {
        value: NONE_OPTION_VALUE.to_string(),
        label: "(none)".to_string(),
    })
    .chain(tables().iter().map(|table| DropdownOption {
        value: table.id.0.to_string(),
        label: format!("{} ({} rows)", table.name, table.row_count),
    }))
    .collect::<Vec<_>>();

    let open_table_for_dropdown = open_table.clone();
    let open_table_for_import = open_table.clone();
    let open_table_for_new_table = open_table.clone();
    let refresh_tables_for_import = refresh_tables.clone();
    let refresh_tables_for_new_table = refresh_tables.clone();
    let import_service_for_import = import_service.clone();
    let table_service_for_new_table = table_service.clone();
    let table_service_for_add_column = table_service.clone();
    let store_for_add_row = store.clone();
    let store_for_add_column = store.clone();
    let store_for_context = store.clone();
    let store_for_grid = store.clone();
    let start_editing_for_keys = start_editing.clone();
    let run_search_for_open = run_search.clone();
    let run_search_for_query = run_search.clone();
    let registry_for_keys = registry.clone();
    let registry_for_selector = registry.clone();

    rsx! {
        div {
            style: "{root_style()}",
            tabindex: "0",
            autofocus: true,
            onclick: move |_| {
                context_menu.set(None);
                context_cell.set(None);
                table_dropdown_open.set(false);
            },
            oncontextmenu: move |event| {
                event.prevent_default();
            },
            onkeydown: move |event| {
                let Some(key) = KeyPress::from_key(&event.key()) else {
                    return;
                };
                if registry_for_keys.dispatch(key) {
                    event.prevent_default();
                    event.stop_propagation();
                    return;
                }
                if editing_cell().is_some() {
                    return;
                }
                let outcome = display.write().handle_key_on_active_cell(key);
                match outcome {
                    KeyOutcome::Submitted => {
                        event.prevent_default();
                        if let Some(active) = display().active_cell() {
                            start_editing_for_keys.borrow_mut()(active.row, active.column);
                        }
                    }
                    KeyOutcome::Moved | KeyOutcome::Cancelled => {
                        event.prevent_default();
                    }
                    KeyOutcome::Ignored => {}
                }
            },

            h2 { "Gridbase" }

            div {
                style: "{toolbar_style()}",
                TableDropdown {
                    label: "Table",
                    options: table_options.clone(),
                    selected: Some(
                        selected_table()
                            .map(|id| id.to_string())
                            .unwrap_or_else(|| NONE_OPTION_VALUE.to_string()),
                    ),
                    open: table_dropdown_open,
                    dropdown_pos: table_dropdown_pos,
                    on_select: move |value: String| {
                        let next = if value == NONE_OPTION_VALUE {
                            None
                        } else {
                            value.parse::<i64>().ok()
                        };
                        open_table_for_dropdown.borrow_mut()(next);
                    }
                }

                button {
                    disabled: busy(),
                    onclick: move |_| {
                        let Some(file_path) = FileDialog::new()
                            .add_filter("CSV", &["csv"])
                            .pick_file()
                        else {
                            return;
                        };
                        *busy.write() = true;
                        *status_line.write() = format!("importing {}", file_path.display());
                        let import_result =
                            run_blocking(|| import_service_for_import.import_csv(&file_path));
                        match import_result {
                            Ok(result) => {
                                refresh_tables_for_import.borrow_mut()();
                                open_table_for_import.borrow_mut()(Some(result.table_id.0));
                                *status_line.write() =
                                    format!("imported {} rows", result.row_count);
                            }
                            Err(err) => {
                                *status_line.write() = format!("import failed: {err}");
                            }
                        }
                        *busy.write() = false;
                    },
                    "Import CSV"
                }

                button {
                    disabled: busy(),
                    onclick: move |_| {
                        let name = format!("table-{}", tables().len() + 1);
                        let new_table = NewTable {
                            name,
                            columns: vec![
                                NewColumn {
                                    name: "id".to_string(),
                                    column_type: ColumnType::Number,
                                    nullable: false,
                                    primary_key: true,
                                },
                                NewColumn {
                                    name: "name".to_string(),
                                    column_type: ColumnType::Text,
                                    nullable: true,
                                    primary_key: false,
                                },
                            ],
                        };
                        match run_blocking(|| table_service_for_new_table.create_table(new_table)) {
                            Ok(table_id) => {
                                refresh_tables_for_new_table.borrow_mut()();
                                open_table_for_new_table.borrow_mut()(Some(table_id.0));
                                *status_line.write() = "Created table".to_string();
                            }
                            Err(err) => {
                                *status_line.write() = format!("create table failed: {err}");
                            }
                        }
                    },
                    "New table"
                }

                button {
                    disabled: busy() || selected_table().is_none(),
                    onclick: move |_| {
                        let position = store_for_add_row.append_blank_row();
                        display.write().select_cell(position, 0);
                    },
                    "Add row"
                }

                button {
                    disabled: busy() || selected_table().is_none(),
                    onclick: move |_| {
                        run_search_for_open.borrow_mut()(String::new());
                        show_selector.set(true);
                    },
                    "Go to record"
                }

                if busy() {
                    span { style: "color: #999;", "working…" }
                }
                span { " {status_line}" }
            }

            if !columns_snapshot.is_empty() {
                div {
                    style: "{grid_container_style()}",
                    HeaderRow {
                        columns: columns_snapshot.clone(),
                        column_width: COLUMN_WIDTH,
                        gutter_width: GUTTER_WIDTH,
                        scroll_x: scroll_x,
                        content_width: content_width,
                        on_add_column: move |_| {
                            new_column_name.set(String::new());
                            new_column_type.set(ColumnType::Text);
                            new_column_nullable.set(true);
                            show_add_column.set(true);
                        },
                    }
                    {rows_snapshot.iter().enumerate().map(|(row_idx, row)| {
                        let row = row.clone();
                        let display_values: Vec<CellValue> = columns_snapshot
                            .iter()
                            .map(|column| {
                                store_for_grid.display_value(CellKey::new(row_idx, column.id))
                            })
                            .collect();
                        let row_statuses: Vec<ModificationStatus> = columns_snapshot
                            .iter()
                            .map(|column| {
                                statuses_snapshot
                                    .get(&CellKey::new(row_idx, column.id))
                                    .cloned()
                                    .unwrap_or_default()
                            })
                            .collect();
                        let row_errors: Vec<Vec<String>> = columns_snapshot
                            .iter()
                            .enumerate()
                            .map(|(column_idx, column)| {
                                let key = CellKey::new(row_idx, column.id);
                                let mut merged =
                                    client_errors_snapshot.get(&key).cloned().unwrap_or_default();
                                merged.extend(
                                    row_statuses[column_idx].errors().iter().cloned(),
                                );
                                merged
                            })
                            .collect();
                        let active_column = active
                            .filter(|cell| cell.row == row_idx)
                            .map(|cell| cell.column);
                        let editing_column = editing_snapshot
                            .filter(|cell| cell.row == row_idx)
                            .and_then(|cell| {
                                columns_snapshot
                                    .iter()
                                    .position(|column| column.id == cell.column)
                            });
                        let is_selected = selected_rows_snapshot.contains(&row_idx);
                        let commit_for_row = commit_cell.clone();
                        let start_for_row = start_editing.clone();
                        let end_for_row = end_editing.clone();
                        rsx!(
                            RowView {
                                key: "{row_idx}",
                                row: row,
                                columns: columns_snapshot.clone(),
                                column_width: COLUMN_WIDTH,
                                gutter_width: GUTTER_WIDTH,
                                scroll_x: scroll_x,
                                content_width: content_width,
                                display_values: display_values,
                                statuses: row_statuses,
                                errors: row_errors,
                                active_column: active_column,
                                editing_column: editing_column,
                                is_selected: is_selected,
                                editing_value: editing_value,
                                on_toggle_select: move |_| {
                                    let mut selected = selected_rows.write();
                                    if selected.contains(&row_idx) {
                                        selected.remove(&row_idx);
                                    } else {
                                        selected.insert(row_idx);
                                    }
                                },
                                on_cell_activate: move |column_idx| {
                                    context_menu.set(None);
                                    context_cell.set(None);
                                    // Clicking away from an open editor discards the draft.
                                    if editing_cell().is_some() {
                                        editing_cell.set(None);
                                        editing_value.set(String::new());
                                    }
                                    display.write().select_cell(row_idx, column_idx);
                                },
                                on_cell_edit_start: move |column_idx| {
                                    start_for_row.borrow_mut()(row_idx, column_idx);
                                },
                                on_cell_commit: move |(column_idx, value)| {
                                    commit_for_row.borrow_mut()(row_idx, column_idx, value);
                                },
                                on_cell_parse_error: move |(column_idx, errors): (usize, Vec<String>)| {
                                    let columns_snapshot = columns();
                                    if let Some(column) = columns_snapshot.get(column_idx) {
                                        client_errors
                                            .write()
                                            .insert(CellKey::new(row_idx, column.id), errors);
                                    }
                                },
                                on_movement: move |key| {
                                    end_for_row.borrow_mut()(key);
                                },
                                on_cell_context_menu: move |(column_idx, x, y)| {
                                    let columns_snapshot = columns();
                                    if let Some(column) = columns_snapshot.get(column_idx) {
                                        display.write().select_cell(row_idx, column_idx);
                                        context_cell
                                            .set(Some(CellKey::new(row_idx, column.id)));
                                        context_menu.set(Some((x, y)));
                                    }
                                },
                            }
                        )
                    })}
                }
            } else {
                div { style: "color: #999; padding: 24px;", "No table loaded" }
            }

            {context_menu().zip(context_cell()).map(|((menu_left, menu_top), menu_cell)| {
                let column = columns_snapshot
                    .iter()
                    .find(|column| column.id == menu_cell.column);
                let nullable = column
                    .map(|column| column.nullable && !column.primary_key)
                    .unwrap_or(false);
                let store_for_menu = store_for_context.clone();
                rsx!(
                    div {
                        style: "{context_menu_style(menu_left, menu_top)}",
                        onclick: move |event| event.stop_propagation(),
                        if nullable {
                            div {
                                style: "padding: 8px 10px; cursor: pointer;",
                                onclick: move |_| {
                                    let outcome = run_blocking(|| {
                                        store_for_menu
                                            .create_or_update_record(menu_cell, CellValue::Null)
                                    });
                                    if let CommitOutcome::Failed(message) = outcome {
                                        *status_line.write() = format!("save failed: {message}");
                                    }
                                    context_menu.set(None);
                                    context_cell.set(None);
                                },
                                "Set to NULL"
                            }
                        } else {
                            div {
                                style: "padding: 8px 10px; color: #999;",
                                "Set to NULL (not nullable)"
                            }
                        }
                    }
                )
            })}

            if show_selector() {
                RecordSelector {
                    registry: registry_for_selector.clone(),
                    selector: selector,
                    query: selector_query,
                    on_query: move |term: String| {
                        run_search_for_query.borrow_mut()(term);
                    },
                    on_submit: move |index: usize| {
                        let candidate = selector().candidates().get(index).cloned();
                        if let Some(candidate) = candidate {
                            let position = rows()
                                .iter()
                                .position(|row| row.record_id == Some(candidate.record_id));
                            match position {
                                Some(position) => {
                                    display.write().select_cell(position, 0);
                                }
                                None => {
                                    *status_line.write() =
                                        "record is not in the loaded page".to_string();
                                }
                            }
                        }
                        show_selector.set(false);
                        selector_query.set(String::new());
                    },
                    on_close: move |_| {
                        show_selector.set(false);
                        selector_query.set(String::new());
                    },
                }
            }

            if show_add_column() {
                div {
                    style: "{modal_overlay_style()}",
                    onclick: move |_| show_add_column.set(false),
                    div {
                        style: "{modal_panel_style()}",
                        onclick: move |event| event.stop_propagation(),
                        div { style: "margin-bottom: 8px; font-weight: 600;", "Add column" }
                        div { style: "display: grid; grid-template-columns: 100px 1fr; gap: 6px; align-items: center;",
                            label { "Name" }
                            input {
                                value: new_column_name(),
                                oninput: move |event| new_column_name.set(event.value()),
                            }
                            label { "Type" }
                            select {
                                onchange: move |event| {
                                    if let Some(column_type) = ColumnType::parse(&event.value()) {
                                        new_column_type.set(column_type);
                                    }
                                },
                                option { value: "text", "text" }
                                option { value: "number", "number" }
                                option { value: "boolean", "boolean" }
                                option { value: "date", "date" }
                            }
                            label { "Nullable" }
                            input {
                                r#type: "checkbox",
                                checked: new_column_nullable(),
                                onclick: move |_| {
                                    new_column_nullable.set(!new_column_nullable());
                                },
                            }
                        }
                        div { style: "display: flex; gap: 8px; margin-top: 12px;",
                            button {
                                onclick: move |_| {
                                    let Some(table) = selected_table() else {
                                        show_add_column.set(false);
                                        return;
                                    };
                                    let name = new_column_name().trim().to_string();
                                    if name.is_empty() {
                                        *status_line.write() =
                                            "column name must not be empty".to_string();
                                        return;
                                    }
                                    let column = NewColumn {
                                        name,
                                        column_type: new_column_type(),
                                        nullable: new_column_nullable(),
                                        primary_key: false,
                                    };
                                    *busy.write() = true;
                                    let result = run_blocking(|| {
                                        table_service_for_add_column
                                            .add_column(TableId(table), column.clone())
                                    });
                                    match result {
                                        Ok(_) => {
                                            if let Err(err) =
                                                run_blocking(|| store_for_add_column.reload())
                                            {
                                                *status_line.write() =
                                                    format!("reload failed: {err}");
                                            } else {
                                                *status_line.write() =
                                                    "Added column".to_string();
                                            }
                                            show_add_column.set(false);
                                        }
                                        Err(err) => {
                                            *status_line.write() =
                                                format!("add column failed: {err}");
                                        }
                                    }
                                    *busy.write() = false;
                                },
                                "Add"
                            }
                            button {
                                onclick: move |_| show_add_column.set(false),
                                "Cancel"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn summarize_record(
    columns: &[crate::domain::entities::table::Column],
    record: &crate::domain::entities::record::Record,
) -> String {
    let parts: Vec<String> = columns
        .iter()
        .filter_map(|column| record.get(&column.id))
        .filter(|value| !value.is_null())
        .take(3)
        .map(|value| value.display())
        .collect();
    if parts.is_empty() {
        "(empty record)".to_string()
    } else {
        parts.join(" · ")
    }
}
