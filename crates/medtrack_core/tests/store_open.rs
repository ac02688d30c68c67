use medtrack_core::db::migrations::latest_version;
use medtrack_core::db::{open_db, open_db_in_memory, open_store, open_with_recovery, DbError};
use medtrack_core::{
    Appointment, AppointmentFields, AppointmentListQuery, AppointmentRepository,
    SqliteAppointmentRepository,
};
use rusqlite::Connection;
use std::cell::Cell;
use std::path::Path;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "appointments");
    assert_table_exists(&conn, "doctors");
}

#[test]
fn reopening_store_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("default.store");

    let appointment = Appointment::new(AppointmentFields::new(
        "Sample Clinic",
        1_704_067_200_000,
        "Annual Checkup",
        "Dr. Smith",
    ));
    {
        let conn = open_store(&path).unwrap();
        let repo = SqliteAppointmentRepository::try_new(&conn).unwrap();
        repo.insert_appointment(&appointment).unwrap();
    }

    let conn = open_store(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let repo = SqliteAppointmentRepository::try_new(&conn).unwrap();
    let listed = repo.list_appointments(&AppointmentListQuery::default()).unwrap();
    assert_eq!(listed, vec![appointment]);
}

#[test]
fn open_store_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app-data").join("medtrack").join("default.store");

    open_store(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn open_db_rejects_newer_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.store");
    write_future_schema(&path);

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
fn incompatible_store_is_deleted_and_recreated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("default.store");
    write_future_schema(&path);

    let conn = open_store(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM appointments;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn corrupt_store_file_is_deleted_and_recreated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("default.store");
    std::fs::write(&path, vec![b'x'; 4096]).unwrap();

    let conn = open_store(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
}

#[test]
fn recovery_removes_file_and_retries_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("default.store");
    std::fs::write(&path, b"stale").unwrap();
    let attempts = Cell::new(0);

    let result = open_with_recovery(&path, |store_path| {
        attempts.set(attempts.get() + 1);
        if attempts.get() == 1 {
            assert!(store_path.exists());
            Err(DbError::UnsupportedSchemaVersion {
                db_version: 7,
                latest_supported: 2,
            })
        } else {
            assert!(!store_path.exists(), "store file must be removed before retry");
            Ok("opened")
        }
    });

    assert_eq!(result.unwrap(), "opened");
    assert_eq!(attempts.get(), 2);
}

#[test]
fn second_failure_is_unrecoverable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("default.store");
    let attempts = Cell::new(0);

    let err = open_with_recovery(&path, |_| -> Result<(), DbError> {
        attempts.set(attempts.get() + 1);
        Err(DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 2,
        })
    })
    .unwrap_err();

    assert_eq!(attempts.get(), 2);
    assert!(err.is_fatal());
    match err {
        DbError::Unrecoverable { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unusable_store_location_is_unrecoverable() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"file").unwrap();
    let path = blocker.join("default.store");

    let err = open_store(&path).unwrap_err();
    assert!(err.is_fatal(), "expected fatal error, got {err}");
}

fn write_future_schema(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
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
