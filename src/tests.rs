use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;

use crate::domain::entities::cell::{CellKey, ModificationStatus};
use crate::domain::entities::record::CellValue;
use crate::domain::entities::table::{ColumnId, ColumnType, NewColumn, TableId};
use crate::infra::sqlite::backend::SqliteBackend;
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::backend::{
    BackendError, NewTable, RecordQuery, RecordsBackend,
};
use crate::usecase::services::import_service::ImportService;
use crate::usecase::services::record_store::{CommitOutcome, RecordStore, StoreEvent};
use crate::usecase::services::table_service::TableService;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("gridbase-{prefix}-{nanos}"))
}

fn test_db(prefix: &str) -> (PathBuf, PathBuf) {
    let temp_dir = unique_test_dir(prefix);
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("gridbase.sqlite");
    (temp_dir, db_path)
}

fn sample_table(backend: &SqliteBackend) -> TableId {
    backend.init().expect("init should succeed");
    backend
        .create_table(NewTable {
            name: "people".to_string(),
            columns: vec![
                NewColumn {
                    name: "id".to_string(),
                    column_type: ColumnType::Number,
                    nullable: false,
                    primary_key: true,
                },
                NewColumn {
                    name: "name".to_string(),
                    column_type: ColumnType::Text,
                    nullable: false,
                    primary_key: false,
                },
                NewColumn {
                    name: "note".to_string(),
                    column_type: ColumnType::Text,
                    nullable: true,
                    primary_key: false,
                },
            ],
        })
        .expect("table should be created")
}

fn record(values: &[(i64, CellValue)]) -> crate::domain::entities::record::Record {
    values
        .iter()
        .map(|(id, value)| (ColumnId(*id), value.clone()))
        .collect()
}

fn column_id(backend: &SqliteBackend, table: TableId, name: &str) -> i64 {
    backend
        .load_columns(table)
        .expect("columns should load")
        .into_iter()
        .find(|column| column.name == name)
        .map(|column| column.id.0)
        .expect("column should exist")
}

#[test]
fn init_db_creates_required_tables() {
    let (temp_dir, db_path) = test_db("init-db");

    let result = init_db(&db_path);
    assert!(result.is_ok(), "init_db should succeed: {result:?}");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('grid_table','grid_column','record','cell')",
            [],
            |row| row.get(0),
        )
        .expect("table count query should succeed");

    assert_eq!(table_count, 4, "required tables should exist");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn created_tables_list_with_their_columns() {
    let (temp_dir, db_path) = test_db("create-table");
    let backend = SqliteBackend::new(db_path);
    let table = sample_table(&backend);

    let tables = backend.list_tables().expect("tables should list");
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "people");
    assert_eq!(tables[0].row_count, 0);

    let columns = backend.load_columns(table).expect("columns should load");
    let names: Vec<&str> = columns.iter().map(|column| column.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "note"]);
    assert!(columns[0].primary_key);
    assert!(!columns[0].nullable, "primary keys are implicitly non-null");
    assert!(columns[2].nullable);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn create_record_reports_missing_required_values() {
    let (temp_dir, db_path) = test_db("create-missing");
    let backend = SqliteBackend::new(db_path);
    let table = sample_table(&backend);
    let note = column_id(&backend, table, "note");

    let result = backend.create_record(
        table,
        record(&[(note, CellValue::Text("only a note".to_string()))]),
    );

    let Err(BackendError::Validation(errors)) = result else {
        panic!("expected validation errors, got {result:?}");
    };
    let id = column_id(&backend, table, "id");
    let name = column_id(&backend, table, "name");
    assert_eq!(
        errors
            .get(&ColumnId(id))
            .map(Vec::as_slice),
        Some(&["value must not be null".to_string()][..])
    );
    assert_eq!(
        errors
            .get(&ColumnId(name))
            .map(Vec::as_slice),
        Some(&["value must not be null".to_string()][..])
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn duplicate_primary_keys_are_rejected() {
    let (temp_dir, db_path) = test_db("duplicate-pk");
    let backend = SqliteBackend::new(db_path);
    let table = sample_table(&backend);
    let id = column_id(&backend, table, "id");
    let name = column_id(&backend, table, "name");

    backend
        .create_record(
            table,
            record(&[
                (id, CellValue::Number(1.0)),
                (name, CellValue::Text("ada".to_string())),
            ]),
        )
        .expect("first record should be created");

    let result = backend.create_record(
        table,
        record(&[
            (id, CellValue::Number(1.0)),
            (name, CellValue::Text("grace".to_string())),
        ]),
    );

    let Err(BackendError::Validation(errors)) = result else {
        panic!("expected validation errors, got {result:?}");
    };
    assert_eq!(
        errors
            .get(&ColumnId(id))
            .map(Vec::as_slice),
        Some(&["duplicate value for primary key".to_string()][..])
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn updates_cannot_touch_primary_keys_or_unknown_columns() {
    let (temp_dir, db_path) = test_db("update-validation");
    let backend = SqliteBackend::new(db_path);
    let table = sample_table(&backend);
    let id = column_id(&backend, table, "id");
    let name = column_id(&backend, table, "name");

    let (record_id, _) = backend
        .create_record(
            table,
            record(&[
                (id, CellValue::Number(1.0)),
                (name, CellValue::Text("ada".to_string())),
            ]),
        )
        .expect("record should be created");

    let pk_edit = backend.update_record(table, record_id, record(&[(id, CellValue::Number(2.0))]));
    let Err(BackendError::Validation(errors)) = pk_edit else {
        panic!("expected validation errors, got {pk_edit:?}");
    };
    assert_eq!(
        errors
            .get(&ColumnId(id))
            .map(Vec::as_slice),
        Some(&["primary key columns are read-only".to_string()][..])
    );

    let unknown = backend.update_record(
        table,
        record_id,
        record(&[(9999, CellValue::Text("x".to_string()))]),
    );
    let Err(BackendError::Validation(errors)) = unknown else {
        panic!("expected validation errors, got {unknown:?}");
    };
    assert_eq!(
        errors
            .get(&ColumnId(9999))
            .map(Vec::as_slice),
        Some(&["unknown column".to_string()][..])
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn stored_text_is_canonicalized_and_returned() {
    let (temp_dir, db_path) = test_db("server-wins");
    let backend = SqliteBackend::new(db_path);
    let table = sample_table(&backend);
    let id = column_id(&backend, table, "id");
    let name = column_id(&backend, table, "name");

    let (_, stored) = backend
        .create_record(
            table,
            record(&[
                (id, CellValue::Number(1.0)),
                (name, CellValue::Text("  padded name  ".to_string())),
            ]),
        )
        .expect("record should be created");

    assert_eq!(
        stored.get(&ColumnId(name)),
        Some(&CellValue::Text("padded name".to_string()))
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn search_filters_fetched_records() {
    let (temp_dir, db_path) = test_db("search");
    let backend = SqliteBackend::new(db_path);
    let table = sample_table(&backend);
    let id = column_id(&backend, table, "id");
    let name = column_id(&backend, table, "name");

    for (number, person) in [(1.0, "ada"), (2.0, "grace"), (3.0, "adela")] {
        backend
            .create_record(
                table,
                record(&[
                    (id, CellValue::Number(number)),
                    (name, CellValue::Text(person.to_string())),
                ]),
            )
            .expect("record should be created");
    }

    let page = backend
        .fetch_records(
            table,
            RecordQuery {
                offset: 0,
                limit: None,
                search: Some("ad".to_string()),
            },
        )
        .expect("search should succeed");

    assert_eq!(page.total, 2);
    let names: Vec<CellValue> = page
        .records
        .iter()
        .filter_map(|(_, rec)| {
            rec.get(&ColumnId(name)).cloned()
        })
        .collect();
    assert_eq!(
        names,
        vec![
            CellValue::Text("ada".to_string()),
            CellValue::Text("adela".to_string())
        ]
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn csv_import_sniffs_column_types() {
    let (temp_dir, db_path) = test_db("csv-import");
    let csv_path = temp_dir.join("inventory.csv");
    fs::write(
        &csv_path,
        "item,count,in_stock,restocked\nbolts,1200,true,2026-01-15\nnuts,80,false,2026-02-01\n",
    )
    .expect("should write csv fixture");

    let import_service = ImportService::new(db_path.clone());
    let result = import_service
        .import_csv(&csv_path)
        .expect("import should succeed");
    assert_eq!(result.row_count, 2);

    let backend = SqliteBackend::new(db_path);
    let columns = backend
        .load_columns(result.table_id)
        .expect("columns should load");
    let types: Vec<ColumnType> = columns.iter().map(|column| column.column_type).collect();
    assert_eq!(
        types,
        vec![
            ColumnType::Text,
            ColumnType::Number,
            ColumnType::Boolean,
            ColumnType::Date,
        ]
    );

    let page = backend
        .fetch_records(result.table_id, RecordQuery::default())
        .expect("records should fetch");
    assert_eq!(page.total, 2);
    let first = &page.records[0].1;
    assert_eq!(
        first.get(&columns[1].id),
        Some(&CellValue::Number(1200.0))
    );
    assert_eq!(first.get(&columns[2].id), Some(&CellValue::Boolean(true)));

    let tables = TableService::new(Arc::new(SqliteBackend::new(
        backend.db_path.clone(),
    )))
    .list_tables()
    .expect("tables should list");
    assert_eq!(tables[0].name, "inventory");
    assert_eq!(tables[0].row_count, 2);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn setting_a_nullable_cell_to_null_processes_then_succeeds() {
    let (temp_dir, db_path) = test_db("null-update");
    let backend = Arc::new(SqliteBackend::new(db_path));
    let table = sample_table(&backend);
    let id = column_id(&backend, table, "id");
    let name = column_id(&backend, table, "name");
    let note = column_id(&backend, table, "note");

    backend
        .create_record(
            table,
            record(&[
                (id, CellValue::Number(1.0)),
                (name, CellValue::Text("ada".to_string())),
                (note, CellValue::Text("temporary".to_string())),
            ]),
        )
        .expect("record should be created");

    let store = Rc::new(RecordStore::new(backend.clone()));
    store.open_table(table).expect("open_table should succeed");

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    store.subscribe(move |_, event| {
        if let StoreEvent::CellStatus { status, .. } = event {
            sink.borrow_mut().push(status.clone());
        }
    });

    let key = CellKey::new(0, ColumnId(note));
    let outcome = store.update_cell(key, CellValue::Null);

    assert_eq!(outcome, CommitOutcome::Committed);
    assert_eq!(
        *log.borrow(),
        vec![ModificationStatus::Processing, ModificationStatus::Success]
    );
    assert_eq!(store.display_value(key), CellValue::Null);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn committing_a_cell_on_a_new_row_creates_the_record() {
    let (temp_dir, db_path) = test_db("create-via-store");
    let backend = Arc::new(SqliteBackend::new(db_path));
    let table = sample_table(&backend);
    let id = column_id(&backend, table, "id");
    let name = column_id(&backend, table, "name");

    let store = Rc::new(RecordStore::new(backend.clone()));
    store.open_table(table).expect("open_table should succeed");

    let position = store.append_blank_row();
    let id_key = CellKey::new(position, ColumnId(id));
    let name_key = CellKey::new(position, ColumnId(name));

    // First commit fails: the name column is still null.
    let outcome = store.create_or_update_record(id_key, CellValue::Number(7.0));
    assert_eq!(outcome, CommitOutcome::Rejected);
    let row = store.row(position).expect("row should exist");
    assert!(row.is_new, "failed create should leave the row new");

    // Second commit carries both pending values and succeeds.
    let outcome =
        store.create_or_update_record(name_key, CellValue::Text("grace".to_string()));
    assert_eq!(outcome, CommitOutcome::Committed);
    let row = store.row(position).expect("row should exist");
    assert!(!row.is_new);
    assert!(row.record_id.is_some());
    assert_eq!(store.display_value(id_key), CellValue::Number(7.0));

    let tables = backend.list_tables().expect("tables should list");
    assert_eq!(tables[0].row_count, 1);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}
