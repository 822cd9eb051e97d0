use staffroll_core::db::schema::table_exists;
use staffroll_core::db::{ConnectionProvider, FileStore, MemoryStore, DEFAULT_BUSY_TIMEOUT};
use staffroll_core::{EmployeeRepository, NewEmployee, SqliteEmployeeRepository};
use std::sync::Arc;

#[test]
fn file_store_bootstraps_schema_and_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("staffroll.db");

    let store = FileStore::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();

    assert!(path.exists());
    assert_eq!(store.path(), path.as_path());
    assert_eq!(store.mode(), "file");
    let conn = store.acquire().unwrap();
    assert!(table_exists(&conn, "employees").unwrap());
}

#[test]
fn reopening_file_store_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staffroll.db");

    let first = SqliteEmployeeRepository::new(FileStore::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap());
    first.add(&NewEmployee::new("Alice", "Eng", 90000.0)).unwrap();
    drop(first);

    let second =
        SqliteEmployeeRepository::new(FileStore::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap());
    assert_eq!(second.count().unwrap(), 1);
    assert_eq!(second.list_all().unwrap()[0].name, "Alice");
}

#[test]
fn memory_stores_are_isolated_from_each_other() {
    let first = SqliteEmployeeRepository::new(MemoryStore::new().unwrap());
    let second = SqliteEmployeeRepository::new(MemoryStore::new().unwrap());

    first.add(&NewEmployee::new("Alice", "Eng", 1.0)).unwrap();

    assert_eq!(first.count().unwrap(), 1);
    assert_eq!(second.count().unwrap(), 0);
}

#[test]
fn memory_store_data_is_visible_through_the_store_connection() {
    let store = Arc::new(MemoryStore::new().unwrap());
    let repo = SqliteEmployeeRepository::new(Arc::clone(&store));
    repo.add(&NewEmployee::new("Alice", "Eng", 1.0)).unwrap();

    let conn = store.acquire().unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(store.mode(), "memory");
}

#[test]
fn memory_store_serves_concurrent_readers_and_writers() {
    let repo = Arc::new(SqliteEmployeeRepository::new(MemoryStore::new().unwrap()));

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let repo = Arc::clone(&repo);
            std::thread::spawn(move || {
                for round in 0..25 {
                    repo.add(&NewEmployee::new(format!("w{worker}-{round}"), "Eng", 1.0))
                        .unwrap();
                    repo.list_all().unwrap();
                    repo.average_salary("Eng").unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(repo.count().unwrap(), 200);
}

#[test]
fn file_store_reports_unusable_location() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "plain file").unwrap();

    let result = FileStore::open(blocker.join("staffroll.db"), DEFAULT_BUSY_TIMEOUT);
    assert!(result.is_err());
}
