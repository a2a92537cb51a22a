use rusqlite::Connection;
use vocab_core::db::migrations::latest_version;
use vocab_core::db::{open_db, open_db_in_memory, DbError};
use vocab_core::{SqliteVocabularyRepository, VocabularyRepository};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "vocabularies");
}

#[test]
fn reopening_keeps_vocabularies_and_word_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data/vocabularies.sqlite3");

    let conn = open_db(&path).unwrap();
    SqliteVocabularyRepository::try_new(&conn)
        .unwrap()
        .create_vocabulary("Spanish")
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "Spanish");
    let names: Vec<String> = SqliteVocabularyRepository::try_new(&conn)
        .unwrap()
        .list_vocabularies()
        .unwrap()
        .into_iter()
        .map(|vocabulary| vocabulary.name)
        .collect();
    assert_eq!(names, vec!["Spanish".to_string()]);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(SqliteVocabularyRepository::try_new(&conn).is_err());
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

#[test]
fn open_reports_uncreatable_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let err = open_db(blocker.join("data/vocabularies.sqlite3")).unwrap_err();
    assert!(
        matches!(&err, DbError::CreateDir { path, .. } if path == &blocker.join("data")),
        "{err}"
    );
}
