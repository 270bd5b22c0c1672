use crate::domain::entities::cell::ModificationStatus;
use crate::domain::entities::table::ColumnType;

/// Cell background colors are a styling contract: every state the grid
/// distinguishes maps to one custom property, overridable from the root.
pub fn root_style() -> String {
    concat!(
        "--cell-bg-selected: #eef4ff; ",
        "--cell-bg-error: #fdecec; ",
        "--cell-bg-processing: #fff8e1; ",
        "--cell-bg-success: #ecf9ec; ",
        "--cell-bg-disabled: #f2f2f2; ",
        "--cell-bg-new: #d9f7d9; ",
        "font-family: 'Noto Sans', sans-serif; padding: 12px; background: #fff; ",
        "min-height: 100vh; height: 100vh; overflow: auto; box-sizing: border-box;"
    )
    .to_string()
}

pub fn toolbar_style() -> String {
    "display: flex; gap: 8px; align-items: center; margin-bottom: 12px; position: sticky; top: 0; background: #fff; z-index: 900; padding: 8px 0;".to_string()
}

pub fn grid_container_style() -> String {
    "border: 1px solid #bbb; background: #fff; max-height: 75vh; overflow-y: auto; overflow-x: hidden; position: relative;".to_string()
}

pub fn header_viewport_style() -> String {
    "overflow: hidden; position: sticky; top: 0; z-index: 10; background: #fff;".to_string()
}

/// Header and body share this inner row container; both translate by the
/// same horizontal offset, which is what keeps them in sync.
pub fn translated_row_style(scroll_x: f64, content_width: f64) -> String {
    format!("display: flex; width: {content_width}px; transform: translateX(-{scroll_x}px);")
}

pub fn header_cell_style(width: f64) -> String {
    format!(
        "flex: 0 0 {width}px; box-sizing: border-box; border: 1px solid #bbb; padding: 4px 6px; font-weight: 600; background: #f7f7f7; white-space: nowrap; overflow: hidden;"
    )
}

pub fn gutter_cell_style(width: f64) -> String {
    format!(
        "flex: 0 0 {width}px; box-sizing: border-box; border: 1px solid #bbb; padding: 4px 6px; background: #f7f7f7; text-align: center; display: flex; gap: 4px; align-items: center; justify-content: center;"
    )
}

pub fn cell_style(width: f64, alignment: &str, background: &str) -> String {
    format!(
        "flex: 0 0 {width}px; box-sizing: border-box; border: 1px solid #ddd; padding: 4px 6px; text-align: {alignment}; background: {background}; position: relative; white-space: nowrap; overflow: hidden;"
    )
}

/// Precedence: in-flight and failed commits outrank selection, selection
/// outranks the passive tints.
pub fn cell_background(
    status: &ModificationStatus,
    is_active: bool,
    is_disabled: bool,
    is_new_row: bool,
) -> &'static str {
    match status {
        ModificationStatus::Processing => "var(--cell-bg-processing)",
        ModificationStatus::Failure(_) => "var(--cell-bg-error)",
        _ if is_active => "var(--cell-bg-selected)",
        _ if is_disabled => "var(--cell-bg-disabled)",
        _ if is_new_row => "var(--cell-bg-new)",
        ModificationStatus::Success => "var(--cell-bg-success)",
        ModificationStatus::Idle => "transparent",
    }
}

pub fn column_alignment(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Number => "right",
        ColumnType::Boolean => "center",
        ColumnType::Text | ColumnType::Date => "left",
    }
}

pub fn null_sentinel_style() -> String {
    "color: #999; font-style: italic;".to_string()
}

pub fn error_popover_style() -> String {
    "position: absolute; left: 0; top: 100%; min-width: 180px; background: #fff; border: 1px solid #d24; color: #d24; padding: 6px 8px; z-index: 50; font-size: 12px; white-space: normal;".to_string()
}

pub fn modal_overlay_style() -> String {
    "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; z-index: 1100;".to_string()
}

pub fn modal_panel_style() -> String {
    "background: #fff; padding: 16px; border: 1px solid #999; min-width: 320px; max-width: 640px;".to_string()
}

pub fn context_menu_style(left: f64, top: f64) -> String {
    format!(
        "position: fixed; left: {left}px; top: {top}px; min-width: 160px; background: #fff; border: 1px solid #bbb; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1200;"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_viewport_is_sticky() {
        let style = header_viewport_style();
        assert!(style.contains("sticky"), "header should stay pinned: {style}");
        assert!(style.contains("overflow: hidden"));
    }

    #[test]
    fn root_style_declares_every_cell_background_property() {
        let style = root_style();
        for property in [
            "--cell-bg-selected",
            "--cell-bg-error",
            "--cell-bg-processing",
            "--cell-bg-success",
            "--cell-bg-disabled",
            "--cell-bg-new",
        ] {
            assert!(style.contains(property), "missing {property}");
        }
    }

    #[test]
    fn header_and_body_rows_translate_by_the_same_offset() {
        let header = translated_row_style(120.0, 800.0);
        let body = translated_row_style(120.0, 800.0);
        assert_eq!(header, body);
        assert!(header.contains("translateX(-120px)"));
    }

    #[test]
    fn commit_states_outrank_selection() {
        let processing = cell_background(&ModificationStatus::Processing, true, false, false);
        assert_eq!(processing, "var(--cell-bg-processing)");

        let failed = cell_background(
            &ModificationStatus::Failure(vec!["bad".to_string()]),
            true,
            false,
            false,
        );
        assert_eq!(failed, "var(--cell-bg-error)");

        let selected = cell_background(&ModificationStatus::Idle, true, false, true);
        assert_eq!(selected, "var(--cell-bg-selected)");

        let idle = cell_background(&ModificationStatus::Idle, false, false, false);
        assert_eq!(idle, "transparent");
    }

    #[test]
    fn numbers_align_right() {
        assert_eq!(column_alignment(ColumnType::Number), "right");
        assert_eq!(column_alignment(ColumnType::Text), "left");
        assert_eq!(column_alignment(ColumnType::Boolean), "center");
    }
}
