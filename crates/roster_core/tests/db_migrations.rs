use roster_core::db::migrations::latest_version;
use roster_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let gateway = open_db_in_memory().unwrap();
    let conn = gateway.connection();

    assert_eq!(gateway.schema_version().unwrap(), latest_version());
    assert_table_exists(conn, "departments");
    assert_table_exists(conn, "sports");
    assert_table_exists(conn, "addresses");
    assert_table_exists(conn, "employees");
    assert_table_exists(conn, "employee_sports");
    assert_index_exists(conn, "idx_departments_active_name");
    assert_index_exists(conn, "idx_sports_active_name");
}

#[test]
fn foreign_keys_are_enforced() {
    let gateway = open_db_in_memory().unwrap();
    let enabled: i64 = gateway
        .connection()
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = gateway
        .connection()
        .execute(
            "INSERT INTO employee_sports (employee_id, sport_id) VALUES (1, 1);",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn opening_same_database_twice_is_idempotent_and_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.db");

    let first = open_db(&path).unwrap();
    assert_eq!(first.schema_version().unwrap(), latest_version());
    first
        .connection()
        .execute("INSERT INTO departments (name) VALUES ('Engineering');", [])
        .unwrap();
    first.close().unwrap();

    let second = open_db(&path).unwrap();
    assert_eq!(second.schema_version().unwrap(), latest_version());
    let count: i64 = second
        .connection()
        .query_row("SELECT COUNT(*) FROM departments;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).err().expect("newer schema must be rejected");
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
fn active_name_index_allows_reuse_after_soft_delete() {
    let gateway = open_db_in_memory().unwrap();
    let conn = gateway.connection();

    conn.execute(
        "INSERT INTO departments (name, is_deleted) VALUES ('Ops', 1);",
        [],
    )
    .unwrap();
    conn.execute("INSERT INTO departments (name) VALUES ('Ops');", [])
        .unwrap();
    let duplicate = conn.execute("INSERT INTO departments (name) VALUES ('Ops');", []);
    assert!(duplicate.is_err());
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
