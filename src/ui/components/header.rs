use dioxus::prelude::*;

use crate::domain::entities::table::Column;
use crate::ui::style::{
    gutter_cell_style, header_cell_style, header_viewport_style, translated_row_style,
};

/// Column headers. The data cells translate by the same horizontal
/// offset as the body rows, so header and grid scroll as one.
#[component]
pub fn HeaderRow(
    columns: Vec<Column>,
    column_width: f64,
    gutter_width: f64,
    scroll_x: f64,
    content_width: f64,
    on_add_column: EventHandler<()>,
) -> Element {
    rsx! {
        div {
            style: "{header_viewport_style()}",
            div {
                style: "display: flex;",
                div { style: "{gutter_cell_style(gutter_width)}", "#" }
                div {
                    style: "overflow: hidden; flex: 1;",
                    div {
                        style: "{translated_row_style(scroll_x, content_width + column_width)}",
                        {columns.iter().map(|column| {
                            let name = column.name.clone();
                            let type_label = column.column_type.as_str();
                            let is_pk = column.primary_key;
                            rsx!(
                                div {
                                    key: "{column.id.0}",
                                    style: "{header_cell_style(column_width)}",
                                    span { "{name}" }
                                    span {
                                        style: "margin-left: 6px; color: #999; font-weight: 400; font-size: 11px;",
                                        "{type_label}"
                                    }
                                    if is_pk {
                                        span {
                                            style: "margin-left: 6px; color: #4c6ef5; font-size: 11px;",
                                            "PK"
                                        }
                                    }
                                }
                            )
                        })}
                        button {
                            style: "flex: 0 0 32px; border: 1px dashed #bbb; background: #fff; cursor: pointer;",
                            title: "Add column",
                            onclick: move |_| on_add_column.call(()),
                            "+"
                        }
                    }
                }
            }
        }
    }
}
