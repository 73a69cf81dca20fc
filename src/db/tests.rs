use super::{get_meta, get_value, open_connection, put_value, CURRENT_SCHEMA_VERSION};
use rusqlite::params;
use uuid::Uuid;

fn unique_db_path() -> String {
    std::env::temp_dir()
        .join(format!("opsboard-db-{}.sqlite", Uuid::now_v7()))
        .display()
        .to_string()
}

fn cleanup_db_files(path: &str) {
    for suffix in ["", "-wal", "-shm"] {
        let candidate = format!("{path}{suffix}");
        let _ = std::fs::remove_file(candidate);
    }
}

fn table_exists(conn: &rusqlite::Connection, table_name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
            params![table_name],
            |row| row.get(0),
        )
        .expect("table existence query should be readable");
    exists == 1
}

#[test]
fn configures_connection_pragmas() {
    let path = unique_db_path();
    let conn = open_connection(&path).expect("connection should open");

    let journal_mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .expect("journal_mode pragma should be readable");
    assert_eq!(journal_mode.to_uppercase(), "WAL");

    let busy_timeout: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .expect("busy_timeout pragma should be readable");
    assert_eq!(busy_timeout, 5000);

    cleanup_db_files(&path);
}

#[test]
fn initializes_required_tables_and_schema_version() {
    let path = unique_db_path();
    let conn = open_connection(&path).expect("connection should open");

    for table in ["schema_migrations", "meta", "kv"] {
        assert!(
            table_exists(&conn, table),
            "expected table '{}' to exist",
            table
        );
    }

    let schema_version = get_meta(&conn, "schema_version")
        .expect("meta should be readable")
        .expect("schema version should be stored");
    assert_eq!(schema_version, CURRENT_SCHEMA_VERSION.to_string());

    cleanup_db_files(&path);
}

#[test]
fn reapplies_migrations_idempotently() {
    let path = unique_db_path();
    let conn_first = open_connection(&path).expect("first open should initialize schema");
    drop(conn_first);

    let conn_second = open_connection(&path).expect("second open should be idempotent");
    let applied_count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .expect("schema_migrations count should be queryable");
    assert_eq!(applied_count, CURRENT_SCHEMA_VERSION);

    cleanup_db_files(&path);
}

#[test]
fn put_value_overwrites_instead_of_merging() {
    let path = unique_db_path();
    let conn = open_connection(&path).expect("connection should open");

    assert_eq!(get_value(&conn, "board_snapshot").expect("read"), None);
    put_value(&conn, "board_snapshot", r#"{"a":1}"#).expect("first write");
    put_value(&conn, "board_snapshot", r#"{"b":2}"#).expect("second write");
    assert_eq!(
        get_value(&conn, "board_snapshot").expect("read"),
        Some(r#"{"b":2}"#.to_string())
    );

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
        .expect("kv count should be queryable");
    assert_eq!(rows, 1);

    cleanup_db_files(&path);
}
