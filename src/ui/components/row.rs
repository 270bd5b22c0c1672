use dioxus::prelude::*;

use crate::domain::entities::cell::ModificationStatus;
use crate::domain::entities::record::{CellValue, Row};
use crate::domain::entities::table::Column;
use crate::ui::components::cell::CellView;
use crate::ui::keyboard::KeyPress;
use crate::ui::style::{gutter_cell_style, translated_row_style};

/// One record's cells plus the row gutter. Carries the row-level
/// highlights: selection, in-flight commits, failed cells and the
/// not-yet-persisted tint.
#[component]
pub fn RowView(
    row: Row,
    columns: Vec<Column>,
    column_width: f64,
    gutter_width: f64,
    scroll_x: f64,
    content_width: f64,
    display_values: Vec<CellValue>,
    statuses: Vec<ModificationStatus>,
    errors: Vec<Vec<String>>,
    active_column: Option<usize>,
    editing_column: Option<usize>,
    is_selected: bool,
    editing_value: Signal<String>,
    on_toggle_select: EventHandler<()>,
    on_cell_activate: EventHandler<usize>,
    on_cell_edit_start: EventHandler<usize>,
    on_cell_commit: EventHandler<(usize, CellValue)>,
    on_cell_parse_error: EventHandler<(usize, Vec<String>)>,
    on_movement: EventHandler<KeyPress>,
    on_cell_context_menu: EventHandler<(usize, f64, f64)>,
) -> Element {
    let has_failure = statuses
        .iter()
        .any(|status| matches!(status, ModificationStatus::Failure(_)));
    let is_processing = statuses.iter().any(ModificationStatus::is_processing);

    let mut row_style = String::from("display: flex;");
    if has_failure {
        row_style.push_str(" box-shadow: inset 2px 0 0 #d24;");
    }
    if is_processing {
        row_style.push_str(" opacity: 0.85;");
    }

    let gutter_style = if is_selected {
        format!("{} background: var(--cell-bg-selected);", gutter_cell_style(gutter_width))
    } else {
        gutter_cell_style(gutter_width)
    };
    let position_label = if row.is_new {
        "*".to_string()
    } else {
        (row.position + 1).to_string()
    };

    rsx! {
        div {
            style: "{row_style}",
            div {
                style: "{gutter_style}",
                input {
                    r#type: "checkbox",
                    checked: is_selected,
                    onclick: move |event| {
                        event.stop_propagation();
                        on_toggle_select.call(());
                    },
                }
                span { "{position_label}" }
            }
            div {
                style: "overflow: hidden; flex: 1;",
                div {
                    style: "{translated_row_style(scroll_x, content_width)}",
                    {columns.iter().enumerate().map(|(column_idx, column)| {
                        let column = column.clone();
                        let value = display_values
                            .get(column_idx)
                            .cloned()
                            .unwrap_or(CellValue::Null);
                        let status = statuses
                            .get(column_idx)
                            .cloned()
                            .unwrap_or_default();
                        let cell_errors = errors.get(column_idx).cloned().unwrap_or_default();
                        rsx!(
                            CellView {
                                key: "{column.id.0}",
                                column: column,
                                width: column_width,
                                value: value,
                                status: status,
                                errors: cell_errors,
                                is_active: active_column == Some(column_idx),
                                is_editing: editing_column == Some(column_idx),
                                is_new_row: row.is_new,
                                editing_value: editing_value,
                                on_activate: move |_| on_cell_activate.call(column_idx),
                                on_edit_start: move |_| on_cell_edit_start.call(column_idx),
                                on_commit: move |value| on_cell_commit.call((column_idx, value)),
                                on_parse_error: move |errors| {
                                    on_cell_parse_error.call((column_idx, errors))
                                },
                                on_movement: move |key| on_movement.call(key),
                                on_context_menu: move |(x, y)| {
                                    on_cell_context_menu.call((column_idx, x, y))
                                },
                            }
                        )
                    })}
                }
            }
        }
    }
}
