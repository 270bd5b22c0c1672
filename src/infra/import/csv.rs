use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::domain::entities::record::parse_numeric_value;
use crate::domain::entities::table::{ColumnType, TableId};
use crate::infra::sqlite::queries::{
    create_table_with_columns, insert_record, load_columns, RawRecord,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::services::import_service::ImportResult;

pub fn import_csv_to_table(db_path: &Path, csv_path: &Path) -> Result<ImportResult> {
    init_db(db_path)?;

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .clone();

    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        rows.push(
            (0..headers.len())
                .map(|idx| record.get(idx).unwrap_or("").to_string())
                .collect(),
        );
    }

    let table_name = csv_path
        .file_stem()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("table")
        .to_string();

    let columns: Vec<(String, ColumnType, bool, bool)> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let column_type = sniff_column_type(rows.iter().map(|row| row[idx].as_str()));
            (header.to_string(), column_type, true, false)
        })
        .collect();

    let table_id = create_table_with_columns(db_path, &table_name, &columns)?;
    let stored_columns = load_columns(db_path, table_id)?;

    let mut row_count = 0_i64;
    for row in &rows {
        let mut raw = RawRecord::new();
        for (idx, column) in stored_columns.iter().enumerate() {
            let value = row[idx].trim();
            if value.is_empty() {
                raw.insert(column.id.0, None);
            } else {
                raw.insert(column.id.0, Some(canonical_text(column.column_type, value)));
            }
        }
        insert_record(db_path, table_id, &raw)?;
        row_count += 1;
    }

    Ok(ImportResult {
        table_id: TableId(table_id),
        row_count,
    })
}

/// Picks the narrowest type every non-empty value fits. Empty columns
/// stay text.
fn sniff_column_type<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut saw_value = false;
    let mut all_number = true;
    let mut all_boolean = true;
    let mut all_date = true;

    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        saw_value = true;
        if parse_numeric_value(value).is_none() {
            all_number = false;
        }
        if !matches!(value.to_ascii_lowercase().as_str(), "true" | "false") {
            all_boolean = false;
        }
        if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
            all_date = false;
        }
    }

    if !saw_value {
        ColumnType::Text
    } else if all_boolean {
        ColumnType::Boolean
    } else if all_number {
        ColumnType::Number
    } else if all_date {
        ColumnType::Date
    } else {
        ColumnType::Text
    }
}

fn canonical_text(column_type: ColumnType, value: &str) -> String {
    match column_type {
        ColumnType::Number => parse_numeric_value(value)
            .map(crate::domain::entities::record::format_number)
            .unwrap_or_else(|| value.to_string()),
        ColumnType::Boolean => value.to_ascii_lowercase(),
        _ => value.to_string(),
    }
}
