use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, types::Value};

use crate::domain::entities::table::{Column, ColumnId, ColumnType, TableId, TableMeta};
use crate::infra::sqlite::schema::open_connection;

/// Storage-side view of one record: column id to encoded cell text.
/// NULL cells are absent or None; the two read back identically.
pub type RawRecord = BTreeMap<i64, Option<String>>;

pub fn list_tables(db_path: &Path) -> Result<Vec<TableMeta>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, name, row_count, created_at
             FROM grid_table
             ORDER BY id ASC",
        )
        .context("failed to prepare table list query")?;

    let tables = stmt
        .query_map([], |row| {
            Ok(TableMeta {
                id: TableId(row.get(0)?),
                name: row.get(1)?,
                row_count: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .context("failed to query tables")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect tables")?;

    Ok(tables)
}

pub fn create_table_with_columns(
    db_path: &Path,
    name: &str,
    columns: &[(String, ColumnType, bool, bool)],
) -> Result<i64> {
    let mut conn = open_connection(db_path)?;
    let tx = conn.transaction().context("failed to start transaction")?;

    tx.execute(
        "INSERT INTO grid_table(name, row_count) VALUES (?1, 0)",
        params![name],
    )
    .context("failed to insert table")?;
    let table_id = tx.last_insert_rowid();

    {
        let mut insert_column = tx
            .prepare(
                "INSERT INTO grid_column(table_id, name, col_type, nullable, primary_key, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .context("failed to prepare column insert")?;
        for (position, (column_name, column_type, nullable, primary_key)) in
            columns.iter().enumerate()
        {
            insert_column
                .execute(params![
                    table_id,
                    column_name,
                    column_type.as_str(),
                    *nullable as i64,
                    *primary_key as i64,
                    position as i64,
                ])
                .context("failed to insert column")?;
        }
    }

    tx.commit().context("failed to commit table creation")?;
    Ok(table_id)
}

pub fn load_columns(db_path: &Path, table_id: i64) -> Result<Vec<Column>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, name, col_type, nullable, primary_key, position
             FROM grid_column
             WHERE table_id = ?1
             ORDER BY position ASC",
        )
        .context("failed to prepare columns query")?;

    let raw = stmt
        .query_map([table_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })
        .context("failed to query columns")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect columns")?;

    let mut columns = Vec::with_capacity(raw.len());
    for (id, name, col_type, nullable, primary_key, position) in raw {
        let column_type = ColumnType::parse(&col_type)
            .with_context(|| format!("unknown column type in storage: {col_type}"))?;
        columns.push(Column {
            id: ColumnId(id),
            name,
            column_type,
            nullable: nullable != 0,
            primary_key: primary_key != 0,
            position,
        });
    }

    Ok(columns)
}

pub fn add_column(
    db_path: &Path,
    table_id: i64,
    name: &str,
    column_type: ColumnType,
    nullable: bool,
) -> Result<Column> {
    let conn = open_connection(db_path)?;
    let position: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM grid_column WHERE table_id = ?1",
            [table_id],
            |row| row.get(0),
        )
        .context("failed to compute column position")?;

    conn.execute(
        "INSERT INTO grid_column(table_id, name, col_type, nullable, primary_key, position)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        params![table_id, name, column_type.as_str(), nullable as i64, position],
    )
    .context("failed to insert column")?;

    Ok(Column {
        id: ColumnId(conn.last_insert_rowid()),
        name: name.to_string(),
        column_type,
        nullable,
        primary_key: false,
        position,
    })
}

pub fn fetch_records_page(
    db_path: &Path,
    table_id: i64,
    offset: i64,
    limit: Option<i64>,
    search: Option<&str>,
) -> Result<(Vec<(i64, RawRecord)>, i64)> {
    let conn = open_connection(db_path)?;

    let mut filter = "table_id = ?".to_string();
    let mut filter_params = vec![Value::Integer(table_id)];
    if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
        filter.push_str(
            " AND EXISTS (
                SELECT 1 FROM cell s
                WHERE s.record_id = record.id
                  AND s.value LIKE ?
            )",
        );
        filter_params.push(Value::Text(format!("%{term}%")));
    }

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM record WHERE {filter}"),
            params_from_iter(filter_params.iter()),
            |row| row.get(0),
        )
        .context("failed to count records")?;

    let page_sql = format!(
        "SELECT r.id, c.column_id, c.value
         FROM (
             SELECT id FROM record WHERE {filter}
             ORDER BY id ASC
             LIMIT ? OFFSET ?
         ) r
         LEFT JOIN cell c ON c.record_id = r.id
         ORDER BY r.id ASC",
    );
    filter_params.push(Value::Integer(limit.unwrap_or(-1)));
    filter_params.push(Value::Integer(offset));

    let mut stmt = conn
        .prepare(&page_sql)
        .context("failed to prepare record page query")?;
    let cell_rows = stmt
        .query_map(params_from_iter(filter_params.iter()), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })
        .context("failed to query record page")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect record page")?;

    let mut records: Vec<(i64, RawRecord)> = Vec::new();
    for (record_id, column_id, value) in cell_rows {
        if records.last().map(|(id, _)| *id) != Some(record_id) {
            records.push((record_id, RawRecord::new()));
        }
        if let (Some(column_id), Some((_, raw))) = (column_id, records.last_mut()) {
            raw.insert(column_id, value);
        }
    }

    Ok((records, total))
}

pub fn read_record(db_path: &Path, record_id: i64) -> Result<RawRecord> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare("SELECT column_id, value FROM cell WHERE record_id = ?1")
        .context("failed to prepare record read")?;

    let cells = stmt
        .query_map([record_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
        })
        .context("failed to query record cells")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect record cells")?;

    Ok(cells.into_iter().collect())
}

pub fn insert_record(db_path: &Path, table_id: i64, values: &RawRecord) -> Result<i64> {
    let mut conn = open_connection(db_path)?;
    let tx = conn.transaction().context("failed to start transaction")?;

    tx.execute("INSERT INTO record(table_id) VALUES (?1)", params![table_id])
        .context("failed to insert record")?;
    let record_id = tx.last_insert_rowid();

    {
        let mut insert_cell = tx
            .prepare("INSERT INTO cell(record_id, column_id, value) VALUES (?1, ?2, ?3)")
            .context("failed to prepare cell insert")?;
        for (column_id, value) in values {
            insert_cell
                .execute(params![record_id, column_id, value])
                .context("failed to insert cell")?;
        }
    }

    tx.execute(
        "UPDATE grid_table SET row_count = row_count + 1 WHERE id = ?1",
        params![table_id],
    )
    .context("failed to bump table row count")?;

    tx.commit().context("failed to commit record insert")?;
    Ok(record_id)
}

pub fn update_record_cells(db_path: &Path, record_id: i64, values: &RawRecord) -> Result<()> {
    let mut conn = open_connection(db_path)?;
    let tx = conn.transaction().context("failed to start transaction")?;

    {
        let mut upsert_cell = tx
            .prepare(
                "INSERT INTO cell(record_id, column_id, value)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(record_id, column_id) DO UPDATE SET value = excluded.value",
            )
            .context("failed to prepare cell upsert")?;
        for (column_id, value) in values {
            upsert_cell
                .execute(params![record_id, column_id, value])
                .context("failed to upsert cell")?;
        }
    }

    tx.commit().context("failed to commit record update")?;
    Ok(())
}

pub fn pk_value_exists(
    db_path: &Path,
    table_id: i64,
    column_id: i64,
    value: &str,
    exclude_record: Option<i64>,
) -> Result<bool> {
    let conn = open_connection(db_path)?;
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*)
             FROM cell c
             JOIN record r ON r.id = c.record_id
             WHERE r.table_id = ?1
               AND c.column_id = ?2
               AND c.value = ?3
               AND c.record_id != ?4",
            params![table_id, column_id, value, exclude_record.unwrap_or(-1)],
            |row| row.get(0),
        )
        .context("failed to check primary key uniqueness")?;
    Ok(count > 0)
}
