use partstock_core::db::migrations::latest_version;
use partstock_core::db::{open_db, open_db_in_memory, open_db_read_only, DbError};
use rusqlite::Connection;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "inventory");
    assert_table_exists(&conn, "inventory_meta");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO inventory (part_name, quantity) VALUES ('bolt', 3);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let quantity: i64 = conn_second
        .query_row(
            "SELECT quantity FROM inventory WHERE part_name = 'bolt';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(quantity, 3);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn negative_quantity_is_rejected_by_schema() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO inventory (part_name, quantity) VALUES ('bolt', -1);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn writes_stamp_last_update_marker() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(marker(&conn), None);

    conn.execute(
        "INSERT INTO inventory (part_name, quantity) VALUES ('bolt', 1);",
        [],
    )
    .unwrap();
    let after_insert = marker(&conn).expect("insert should stamp marker");
    assert!(after_insert > 0);

    conn.execute("DELETE FROM inventory WHERE part_name = 'bolt';", [])
        .unwrap();
    assert!(marker(&conn).unwrap() >= after_insert);
}

#[test]
fn marker_has_millisecond_resolution() {
    let conn = open_db_in_memory().unwrap();
    let before = now_ms();
    conn.execute(
        "INSERT INTO inventory (part_name, quantity) VALUES ('bolt', 1);",
        [],
    )
    .unwrap();
    let after = now_ms();

    let stamped = marker(&conn).unwrap();
    assert!(
        (before - 1..=after).contains(&stamped),
        "marker {stamped} outside [{before}, {after}]"
    );
}

#[test]
fn read_only_open_requires_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");

    let err = open_db_read_only(&path).unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));
    assert!(!path.exists());
}

#[test]
fn read_only_open_rejects_unmigrated_file_without_migrating_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.db");
    let raw = Connection::open(&path).unwrap();
    raw.execute_batch("CREATE TABLE scratch (id INTEGER);").unwrap();

    match open_db_read_only(&path).unwrap_err() {
        DbError::SchemaNotReady {
            db_version,
            expected,
        } => {
            assert_eq!(db_version, 0);
            assert_eq!(expected, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(schema_version(&raw), 0);
}

#[test]
fn read_only_handle_reads_rows_but_cannot_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.db");
    let writer = open_db(&path).unwrap();
    writer
        .execute(
            "INSERT INTO inventory (part_name, quantity) VALUES ('nut', 8);",
            [],
        )
        .unwrap();

    let reader = open_db_read_only(&path).unwrap();
    let quantity: i64 = reader
        .query_row(
            "SELECT quantity FROM inventory WHERE part_name = 'nut';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(quantity, 8);
    assert!(reader
        .execute("DELETE FROM inventory WHERE part_name = 'nut';", [])
        .is_err());
}

fn now_ms() -> i64 {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    i64::try_from(elapsed.as_millis()).unwrap()
}

fn marker(conn: &Connection) -> Option<i64> {
    conn.query_row(
        "SELECT value FROM inventory_meta WHERE key = 'last_updated_at';",
        [],
        |row| row.get(0),
    )
    .ok()
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
