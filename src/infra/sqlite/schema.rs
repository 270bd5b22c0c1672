use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    Ok(conn)
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS grid_table (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE,
            row_count   INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS grid_column (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            table_id    INTEGER NOT NULL,
            name        TEXT NOT NULL,
            col_type    TEXT NOT NULL,
            nullable    INTEGER NOT NULL DEFAULT 1,
            primary_key INTEGER NOT NULL DEFAULT 0,
            position    INTEGER NOT NULL,
            FOREIGN KEY (table_id) REFERENCES grid_table(id)
        );

        CREATE TABLE IF NOT EXISTS record (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            table_id    INTEGER NOT NULL,
            created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (table_id) REFERENCES grid_table(id)
        );

        CREATE TABLE IF NOT EXISTS cell (
            record_id   INTEGER NOT NULL,
            column_id   INTEGER NOT NULL,
            value       TEXT,
            PRIMARY KEY (record_id, column_id),
            FOREIGN KEY (record_id) REFERENCES record(id),
            FOREIGN KEY (column_id) REFERENCES grid_column(id)
        );

        CREATE INDEX IF NOT EXISTS idx_column_table
            ON grid_column(table_id, position);

        CREATE INDEX IF NOT EXISTS idx_record_table
            ON record(table_id);

        CREATE INDEX IF NOT EXISTS idx_cell_column_value
            ON cell(column_id, value);
        ",
    )
    .context("failed to initialize schema")?;

    Ok(())
}
