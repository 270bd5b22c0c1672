use dioxus::prelude::*;

use crate::domain::entities::cell::ModificationStatus;
use crate::domain::entities::record::CellValue;
use crate::domain::entities::table::{Column, ColumnType};
use crate::ui::keyboard::KeyPress;
use crate::ui::style::{
    cell_background, cell_style, column_alignment, error_popover_style, null_sentinel_style,
};

/// One grid cell. Renders the editor matching the column type, commits
/// only values that differ from the displayed one, and hands movement
/// keys back to the parent for delegation to the display controller.
#[component]
pub fn CellView(
    column: Column,
    width: f64,
    value: CellValue,
    status: ModificationStatus,
    errors: Vec<String>,
    is_active: bool,
    is_editing: bool,
    is_new_row: bool,
    mut editing_value: Signal<String>,
    on_activate: EventHandler<()>,
    on_edit_start: EventHandler<()>,
    on_commit: EventHandler<CellValue>,
    on_parse_error: EventHandler<Vec<String>>,
    on_movement: EventHandler<KeyPress>,
    on_context_menu: EventHandler<(f64, f64)>,
) -> Element {
    let column_type = column.column_type;
    // Primary keys are writable exactly once, while the row is new.
    let disabled = column.primary_key && !is_new_row;
    let alignment = column_alignment(column_type);
    let background = cell_background(&status, is_active, disabled, is_new_row);
    let style = cell_style(width, alignment, background);
    let show_errors = is_active && !errors.is_empty();
    let committed = value.clone();

    if is_editing {
        return rsx! {
            div {
                style: "{style}",
                input {
                    style: "width: 100%; box-sizing: border-box; border: 1px solid #4c6ef5; padding: 2px 4px;",
                    value: editing_value(),
                    autofocus: true,
                    oninput: move |event| editing_value.set(event.value()),
                    onkeydown: move |event| {
                        let Some(key) = KeyPress::from_key(&event.key()) else {
                            return;
                        };
                        match key {
                            KeyPress::Enter | KeyPress::Tab => {
                                event.prevent_default();
                                event.stop_propagation();
                                match CellValue::parse_input(column_type, &editing_value()) {
                                    Ok(parsed) => {
                                        if parsed != committed {
                                            on_commit.call(parsed);
                                        }
                                        on_movement.call(key);
                                    }
                                    Err(message) => on_parse_error.call(vec![message]),
                                }
                            }
                            KeyPress::Escape => {
                                event.stop_propagation();
                                on_movement.call(KeyPress::Escape);
                            }
                            _ => {
                                // Arrows move the caret, not the grid.
                                event.stop_propagation();
                            }
                        }
                    },
                }
                if show_errors {
                    div { style: "{error_popover_style()}",
                        {errors.iter().map(|error| rsx!(div { "{error}" }))}
                    }
                }
            }
        };
    }

    if column_type == ColumnType::Boolean && !disabled {
        let checked = matches!(value, CellValue::Boolean(true));
        let is_null = value.is_null();
        return rsx! {
            div {
                style: "{style}",
                onclick: move |_| on_activate.call(()),
                oncontextmenu: move |event| {
                    event.prevent_default();
                    event.stop_propagation();
                    let point = event.client_coordinates();
                    on_context_menu.call((point.x, point.y));
                },
                input {
                    r#type: "checkbox",
                    checked: checked,
                    onclick: move |event| {
                        event.stop_propagation();
                        on_activate.call(());
                        on_commit.call(CellValue::Boolean(!checked));
                    },
                }
                if is_null {
                    span { style: "{null_sentinel_style()} margin-left: 4px;", "NULL" }
                }
                if show_errors {
                    div { style: "{error_popover_style()}",
                        {errors.iter().map(|error| rsx!(div { "{error}" }))}
                    }
                }
            }
        };
    }

    let formatted = value.display();
    let is_null = value.is_null();

    rsx! {
        div {
            style: "{style}",
            onclick: move |_| on_activate.call(()),
            ondoubleclick: move |_| {
                if !disabled {
                    on_edit_start.call(());
                }
            },
            oncontextmenu: move |event| {
                event.prevent_default();
                event.stop_propagation();
                let point = event.client_coordinates();
                on_context_menu.call((point.x, point.y));
            },
            if is_null {
                span { style: "{null_sentinel_style()}", "NULL" }
            } else {
                "{formatted}"
            }
            if show_errors {
                div { style: "{error_popover_style()}",
                    {errors.iter().map(|error| rsx!(div { "{error}" }))}
                }
            }
        }
    }
}
