use std::collections::{BTreeSet, HashMap};

use dioxus::prelude::{use_signal, Signal};

use crate::domain::entities::cell::{CellKey, ModificationStatus};
use crate::domain::entities::record::Row;
use crate::domain::entities::table::{Column, ColumnType, TableMeta};
use crate::ui::display::DisplayController;
use crate::ui::selector::SelectorState;

pub struct GridState {
    pub tables: Signal<Vec<TableMeta>>,
    pub selected_table: Signal<Option<i64>>,
    pub columns: Signal<Vec<Column>>,
    pub rows: Signal<Vec<Row>>,
    pub statuses: Signal<HashMap<CellKey, ModificationStatus>>,
    pub client_errors: Signal<HashMap<CellKey, Vec<String>>>,
    pub display: Signal<DisplayController>,
    pub editing_cell: Signal<Option<CellKey>>,
    pub editing_value: Signal<String>,
    pub selected_rows: Signal<BTreeSet<usize>>,
    pub busy: Signal<bool>,
    pub status_line: Signal<String>,
    pub context_menu: Signal<Option<(f64, f64)>>,
    pub context_cell: Signal<Option<CellKey>>,
    pub show_selector: Signal<bool>,
    pub selector: Signal<SelectorState>,
    pub selector_query: Signal<String>,
    pub show_add_column: Signal<bool>,
    pub new_column_name: Signal<String>,
    pub new_column_type: Signal<ColumnType>,
    pub new_column_nullable: Signal<bool>,
}

impl GridState {
    pub fn new() -> Self {
        Self {
            tables: use_signal(Vec::<TableMeta>::new),
            selected_table: use_signal(|| None::<i64>),
            columns: use_signal(Vec::<Column>::new),
            rows: use_signal(Vec::<Row>::new),
            statuses: use_signal(HashMap::<CellKey, ModificationStatus>::new),
            client_errors: use_signal(HashMap::<CellKey, Vec<String>>::new),
            display: use_signal(DisplayController::new),
            editing_cell: use_signal(|| None::<CellKey>),
            editing_value: use_signal(String::new),
            selected_rows: use_signal(BTreeSet::<usize>::new),
            busy: use_signal(|| false),
            status_line: use_signal(|| "Ready".to_string()),
            context_menu: use_signal(|| None::<(f64, f64)>),
            context_cell: use_signal(|| None::<CellKey>),
            show_selector: use_signal(|| false),
            selector: use_signal(SelectorState::new),
            selector_query: use_signal(String::new),
            show_add_column: use_signal(|| false),
            new_column_name: use_signal(String::new),
            new_column_type: use_signal(|| ColumnType::Text),
            new_column_nullable: use_signal(|| true),
        }
    }
}
