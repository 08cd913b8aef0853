use bodymap_core::db::migrations::latest_version;
use bodymap_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "known_users");
    assert_table_exists(&conn, "body_maps");
    assert_table_exists(&conn, "body_regions");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bodymap.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "body_maps");

    let journal: String = conn_second
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(journal.to_ascii_lowercase(), "wal");
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
fn opening_database_without_one_current_map_index_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tampered.db");

    drop(open_db(&path).unwrap());
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("DROP INDEX idx_body_maps_one_current_per_owner;")
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::MissingSchemaObject("idx_body_maps_one_current_per_owner")
    ));
}

#[test]
fn opening_database_with_version_but_no_tables_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::MissingSchemaObject("known_users")));
}

#[test]
fn schema_rejects_second_current_map_for_same_owner() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO body_maps (uuid, owner, status, created_at) VALUES ('a', 'u1', 'current', 1);",
        [],
    )
    .unwrap();

    let second = conn.execute(
        "INSERT INTO body_maps (uuid, owner, status, created_at) VALUES ('b', 'u1', 'current', 2);",
        [],
    );
    assert!(second.is_err());

    // Saved maps and other owners are unaffected by the partial index.
    conn.execute(
        "INSERT INTO body_maps (uuid, owner, status, created_at, saved_at)
         VALUES ('c', 'u1', 'saved', 1, 2);",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO body_maps (uuid, owner, status, created_at) VALUES ('d', 'u2', 'current', 1);",
        [],
    )
    .unwrap();
}

#[test]
fn schema_enforces_saved_at_and_score_checks() {
    let conn = open_db_in_memory().unwrap();

    let saved_without_stamp = conn.execute(
        "INSERT INTO body_maps (uuid, owner, status, created_at) VALUES ('a', 'u1', 'saved', 1);",
        [],
    );
    assert!(saved_without_stamp.is_err());

    conn.execute(
        "INSERT INTO body_maps (uuid, owner, status, created_at) VALUES ('m', 'u1', 'current', 1);",
        [],
    )
    .unwrap();
    let bad_score = conn.execute(
        "INSERT INTO body_regions (uuid, map_uuid, name, score, created_at)
         VALUES ('r', 'm', 'knee', 11, 1);",
        [],
    );
    assert!(bad_score.is_err());
}

#[test]
fn deleting_map_row_cascades_to_regions() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO body_maps (uuid, owner, status, created_at) VALUES ('m', 'u1', 'current', 1);",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO body_regions (uuid, map_uuid, name, created_at) VALUES ('r', 'm', 'knee', 1);",
        [],
    )
    .unwrap();

    conn.execute("DELETE FROM body_maps WHERE uuid = 'm';", [])
        .unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM body_regions;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
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
