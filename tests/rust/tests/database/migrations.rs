//! Migration tests

use pretty_assertions::assert_eq;
use stayhub_storage::Database;
use tests::db::TestDatabase;

#[test]
fn test_fresh_database_is_at_latest_version() {
    let test_db = TestDatabase::new();
    assert_eq!(test_db.db.schema_version().unwrap(), 1);
    assert!(test_db.db_path().exists());
}

#[test]
fn test_reopen_keeps_version_and_foreign_keys() {
    let test_db = TestDatabase::new();
    let path = test_db.db_path().to_path_buf();

    let reopened = Database::open(&path).unwrap();
    assert_eq!(reopened.schema_version().unwrap(), 1);

    let foreign_keys: i64 = reopened
        .connection()
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);

    let applied: i64 = reopened
        .connection()
        .query_row("SELECT count(*) FROM schema_migrations", [], |row| row.get(0))
        .unwrap();
    assert_eq!(applied, 1);
}
