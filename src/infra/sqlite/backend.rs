use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::entities::record::{
    format_number, parse_numeric_value, CellValue, Record, RecordId,
};
use crate::domain::entities::table::{Column, ColumnId, ColumnType, NewColumn, TableId, TableMeta};
use crate::infra::sqlite::queries::{
    add_column, create_table_with_columns, fetch_records_page, insert_record, list_tables,
    load_columns, pk_value_exists, read_record, update_record_cells, RawRecord,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::backend::{
    BackendError, FieldErrors, NewTable, RecordPage, RecordQuery, RecordsBackend,
};

/// SQLite realization of the records backend port. Validation happens
/// here, on the storage side of the port, and is reported back as
/// per-field error maps.
pub struct SqliteBackend {
    pub db_path: PathBuf,
}

impl SqliteBackend {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    fn columns(&self, table: TableId) -> Result<Vec<Column>, BackendError> {
        load_columns(&self.db_path, table.0).map_err(|err| BackendError::Message(err.to_string()))
    }

    fn decode_record(columns: &[Column], raw: &RawRecord) -> Record {
        let mut record = Record::new();
        for column in columns {
            let value = raw
                .get(&column.id.0)
                .and_then(|value| value.as_deref())
                .map(|text| decode_value(column.column_type, text))
                .unwrap_or(CellValue::Null);
            record.insert(column.id, value);
        }
        record
    }

    fn validate(
        &self,
        table: TableId,
        columns: &[Column],
        values: &Record,
        exclude_record: Option<i64>,
        is_create: bool,
    ) -> Result<(), BackendError> {
        let mut errors = FieldErrors::new();

        for column in columns {
            let supplied = values.get(&column.id);
            let value = supplied.cloned().unwrap_or(CellValue::Null);

            if column.primary_key && !is_create && supplied.is_some() {
                push_error(&mut errors, column.id, "primary key columns are read-only");
                continue;
            }
            if !is_create && supplied.is_none() {
                continue;
            }

            if value.is_null() {
                if !column.nullable || column.primary_key {
                    push_error(&mut errors, column.id, "value must not be null");
                }
                continue;
            }

            if let Some(message) = type_mismatch(column.column_type, &value) {
                push_error(&mut errors, column.id, &message);
                continue;
            }

            if column.primary_key && is_create {
                if let Some(encoded) = encode_value(&value) {
                    let duplicate = pk_value_exists(
                        &self.db_path,
                        table.0,
                        column.id.0,
                        &encoded,
                        exclude_record,
                    )
                    .map_err(|err| BackendError::Message(err.to_string()))?;
                    if duplicate {
                        push_error(&mut errors, column.id, "duplicate value for primary key");
                    }
                }
            }
        }

        for column_id in values.keys() {
            if !columns.iter().any(|column| column.id == *column_id) {
                push_error(&mut errors, *column_id, "unknown column");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(BackendError::Validation(errors))
        }
    }
}

impl RecordsBackend for SqliteBackend {
    fn init(&self) -> Result<(), BackendError> {
        init_db(&self.db_path).map_err(|err| BackendError::Message(err.to_string()))
    }

    fn list_tables(&self) -> Result<Vec<TableMeta>, BackendError> {
        list_tables(&self.db_path).map_err(|err| BackendError::Message(err.to_string()))
    }

    fn create_table(&self, table: NewTable) -> Result<TableId, BackendError> {
        if table.name.trim().is_empty() {
            return Err(BackendError::message("table name must not be empty"));
        }
        let columns: Vec<(String, ColumnType, bool, bool)> = table
            .columns
            .iter()
            .map(|column| {
                (
                    column.name.clone(),
                    column.column_type,
                    column.nullable && !column.primary_key,
                    column.primary_key,
                )
            })
            .collect();
        let table_id = create_table_with_columns(&self.db_path, table.name.trim(), &columns)
            .map_err(|err| BackendError::Message(err.to_string()))?;
        Ok(TableId(table_id))
    }

    fn load_columns(&self, table: TableId) -> Result<Vec<Column>, BackendError> {
        self.columns(table)
    }

    fn add_column(&self, table: TableId, column: NewColumn) -> Result<Column, BackendError> {
        let name = column.name.trim();
        if name.is_empty() {
            return Err(BackendError::message("column name must not be empty"));
        }
        if column.primary_key {
            return Err(BackendError::message(
                "primary key columns can only be created with the table",
            ));
        }
        add_column(&self.db_path, table.0, name, column.column_type, column.nullable)
            .map_err(|err| BackendError::Message(err.to_string()))
    }

    fn fetch_records(
        &self,
        table: TableId,
        query: RecordQuery,
    ) -> Result<RecordPage, BackendError> {
        let columns = self.columns(table)?;
        let (raw_records, total) = fetch_records_page(
            &self.db_path,
            table.0,
            query.offset,
            query.limit,
            query.search.as_deref(),
        )
        .map_err(|err| BackendError::Message(err.to_string()))?;

        let records = raw_records
            .into_iter()
            .map(|(record_id, raw)| (RecordId(record_id), Self::decode_record(&columns, &raw)))
            .collect();

        Ok(RecordPage { records, total })
    }

    fn create_record(
        &self,
        table: TableId,
        values: Record,
    ) -> Result<(RecordId, Record), BackendError> {
        let columns = self.columns(table)?;
        let values = canonicalize(values);
        self.validate(table, &columns, &values, None, true)?;

        let raw: RawRecord = values
            .iter()
            .map(|(column_id, value)| (column_id.0, encode_value(value)))
            .collect();
        let record_id = insert_record(&self.db_path, table.0, &raw)
            .map_err(|err| BackendError::Message(err.to_string()))?;

        let stored = read_record(&self.db_path, record_id)
            .map_err(|err| BackendError::Message(err.to_string()))?;
        Ok((RecordId(record_id), Self::decode_record(&columns, &stored)))
    }

    fn update_record(
        &self,
        table: TableId,
        record: RecordId,
        patch: Record,
    ) -> Result<Record, BackendError> {
        let columns = self.columns(table)?;
        let patch = canonicalize(patch);
        self.validate(table, &columns, &patch, Some(record.0), false)?;

        let raw: RawRecord = patch
            .iter()
            .map(|(column_id, value)| (column_id.0, encode_value(value)))
            .collect();
        update_record_cells(&self.db_path, record.0, &raw)
            .map_err(|err| BackendError::Message(err.to_string()))?;

        let stored = read_record(&self.db_path, record.0)
            .map_err(|err| BackendError::Message(err.to_string()))?;
        Ok(Self::decode_record(&columns, &stored))
    }
}

fn push_error(errors: &mut FieldErrors, column: ColumnId, message: &str) {
    errors.entry(column).or_default().push(message.to_string());
}

fn type_mismatch(column_type: ColumnType, value: &CellValue) -> Option<String> {
    let matches = matches!(
        (column_type, value),
        (ColumnType::Text, CellValue::Text(_))
            | (ColumnType::Number, CellValue::Number(_))
            | (ColumnType::Boolean, CellValue::Boolean(_))
            | (ColumnType::Date, CellValue::Date(_))
    );
    if matches {
        None
    } else {
        Some(format!("expected a {} value", column_type.as_str()))
    }
}

/// Storage canonicalization; stored values are what the client gets back.
fn canonicalize(values: Record) -> Record {
    values
        .into_iter()
        .map(|(column, value)| {
            let value = match value {
                CellValue::Text(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::Text(trimmed.to_string())
                    }
                }
                other => other,
            };
            (column, value)
        })
        .collect()
}

fn encode_value(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Null => None,
        CellValue::Text(text) => Some(text.clone()),
        CellValue::Number(number) => Some(format_number(*number)),
        CellValue::Boolean(boolean) => Some(boolean.to_string()),
        CellValue::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
    }
}

fn decode_value(column_type: ColumnType, text: &str) -> CellValue {
    match column_type {
        ColumnType::Text => CellValue::Text(text.to_string()),
        ColumnType::Number => parse_numeric_value(text)
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::Text(text.to_string())),
        ColumnType::Boolean => match text {
            "true" => CellValue::Boolean(true),
            "false" => CellValue::Boolean(false),
            other => CellValue::Text(other.to_string()),
        },
        ColumnType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(CellValue::Date)
            .unwrap_or_else(|_| CellValue::Text(text.to_string())),
    }
}
