use std::sync::Arc;

use crate::domain::entities::record::{Record, RecordId};
use crate::domain::entities::table::{Column, NewColumn, TableId, TableMeta};
use crate::usecase::ports::backend::{BackendError, NewTable, RecordQuery, RecordsBackend};

/// Table-level operations over the backend port: listing, shape changes
/// and the record search the selector uses.
pub struct TableService {
    backend: Arc<dyn RecordsBackend>,
}

impl TableService {
    pub fn new(backend: Arc<dyn RecordsBackend>) -> Self {
        Self { backend }
    }

    pub fn list_tables(&self) -> Result<Vec<TableMeta>, BackendError> {
        self.backend.list_tables()
    }

    pub fn create_table(&self, table: NewTable) -> Result<TableId, BackendError> {
        self.backend.create_table(table)
    }

    pub fn add_column(&self, table: TableId, column: NewColumn) -> Result<Column, BackendError> {
        self.backend.add_column(table, column)
    }

    pub fn search_records(
        &self,
        table: TableId,
        term: &str,
        limit: i64,
    ) -> Result<Vec<(RecordId, Record)>, BackendError> {
        let query = RecordQuery {
            offset: 0,
            limit: Some(limit),
            search: Some(term.to_string()),
        };
        Ok(self.backend.fetch_records(table, query)?.records)
    }
}
