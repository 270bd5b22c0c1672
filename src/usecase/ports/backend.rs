use std::collections::BTreeMap;

use crate::domain::entities::record::{Record, RecordId};
use crate::domain::entities::table::{Column, ColumnId, NewColumn, TableId, TableMeta};

/// Per-field validation errors reported by the backend.
pub type FieldErrors = BTreeMap<ColumnId, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request was understood but the payload failed validation.
    Validation(FieldErrors),
    /// Transport or storage failure; no structured errors available.
    Message(String),
}

impl BackendError {
    pub fn message(text: impl Into<String>) -> Self {
        BackendError::Message(text.into())
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Validation(errors) => {
                let count: usize = errors.values().map(Vec::len).sum();
                write!(f, "validation failed ({count} errors)")
            }
            BackendError::Message(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for BackendError {}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordQuery {
    pub offset: i64,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage {
    pub records: Vec<(RecordId, Record)>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTable {
    pub name: String,
    pub columns: Vec<NewColumn>,
}

/// Backend collaborator for record create/update and table shape changes.
/// The storage side of this port owns its format; payloads cross as
/// column-id to value mappings.
pub trait RecordsBackend: Send + Sync {
    fn init(&self) -> Result<(), BackendError>;

    fn list_tables(&self) -> Result<Vec<TableMeta>, BackendError>;
    fn create_table(&self, table: NewTable) -> Result<TableId, BackendError>;

    fn load_columns(&self, table: TableId) -> Result<Vec<Column>, BackendError>;
    fn add_column(&self, table: TableId, column: NewColumn) -> Result<Column, BackendError>;

    fn fetch_records(&self, table: TableId, query: RecordQuery)
        -> Result<RecordPage, BackendError>;
    fn create_record(
        &self,
        table: TableId,
        values: Record,
    ) -> Result<(RecordId, Record), BackendError>;
    fn update_record(
        &self,
        table: TableId,
        record: RecordId,
        patch: Record,
    ) -> Result<Record, BackendError>;
}
