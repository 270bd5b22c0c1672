use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::entities::table::TableId;
use crate::infra::import::csv::import_csv_to_table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportResult {
    pub table_id: TableId,
    pub row_count: i64,
}

pub struct ImportService {
    db_path: PathBuf,
}

impl ImportService {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    pub fn import_csv(&self, path: &Path) -> Result<ImportResult> {
        import_csv_to_table(&self.db_path, path)
    }
}
