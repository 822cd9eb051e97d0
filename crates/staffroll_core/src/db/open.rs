//! Connection providers for file-backed and in-memory SQLite stores.
//!
//! # Responsibility
//! - Open one SQLite connection per repository operation.
//! - Bootstrap the schema once when a store is opened.
//!
//! # Invariants
//! - File connections are never cached or shared between operations.
//! - The in-memory connection is used by one operation at a time.
//! - Returned connections have the store's busy timeout applied.

use super::schema::ensure_schema;
use super::{DbError, DbResult};
use log::{error, info, trace};
use rusqlite::Connection;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Default wait applied when SQLite reports the database as busy.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection handed to one repository operation.
///
/// Dropping it closes a file connection or releases the in-memory one.
pub enum StoreConnection<'a> {
    Owned(Connection),
    Exclusive(MutexGuard<'a, Connection>),
}

impl Deref for StoreConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            Self::Owned(conn) => conn,
            Self::Exclusive(guard) => &**guard,
        }
    }
}

impl From<Connection> for StoreConnection<'_> {
    fn from(conn: Connection) -> Self {
        Self::Owned(conn)
    }
}

/// Source of ready-to-use connections to the employee store.
///
/// Callers release the returned connection by dropping it.
pub trait ConnectionProvider: Send + Sync {
    fn acquire(&self) -> DbResult<StoreConnection<'_>>;

    /// Short label used in diagnostics (`file` or `memory`).
    fn mode(&self) -> &'static str;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for std::sync::Arc<P> {
    fn acquire(&self) -> DbResult<StoreConnection<'_>> {
        (**self).acquire()
    }

    fn mode(&self) -> &'static str {
        (**self).mode()
    }
}

/// SQLite database file reachable through a configured path.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl FileStore {
    /// Opens (creating when missing) the database file and bootstraps the schema.
    ///
    /// # Side effects
    /// - Creates the parent directory of `path` when it does not exist.
    /// - Emits `db_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> DbResult<Self> {
        let started_at = Instant::now();
        let path = path.as_ref().to_path_buf();
        info!(
            "event=db_open module=db status=start mode=file path={}",
            path.display()
        );

        let store = Self { path, busy_timeout };
        match store.bootstrap() {
            Ok(()) => {
                info!(
                    "event=db_open module=db status=ok mode=file duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(store)
            }
            Err(err) => {
                error!(
                    "event=db_open module=db status=error mode=file duration_ms={} error_code=db_bootstrap_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn bootstrap(&self) -> DbResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| DbError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let conn = self.acquire()?;
        ensure_schema(&conn)
    }
}

impl ConnectionProvider for FileStore {
    fn acquire(&self) -> DbResult<StoreConnection<'_>> {
        let conn = Connection::open(&self.path).map_err(|err| {
            error!(
                "event=db_acquire module=db status=error mode=file error_code=db_open_failed error={}",
                err
            );
            DbError::from(err)
        })?;
        conn.busy_timeout(self.busy_timeout)?;
        trace!("event=db_acquire module=db status=ok mode=file");
        Ok(conn.into())
    }

    fn mode(&self) -> &'static str {
        "file"
    }
}

/// Private in-memory database, mainly for tests and demos.
///
/// A single connection backs the store for its whole lifetime; operations
/// take turns on it, so concurrent callers wait instead of failing.
pub struct MemoryStore {
    conn: Mutex<Connection>,
}

impl MemoryStore {
    /// Creates a fresh in-memory database with the schema applied.
    pub fn new() -> DbResult<Self> {
        let started_at = Instant::now();
        info!("event=db_open module=db status=start mode=memory");

        let conn = match Connection::open_in_memory() {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_open_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };
        ensure_schema(&conn)?;

        info!(
            "event=db_open module=db status=ok mode=memory duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl ConnectionProvider for MemoryStore {
    fn acquire(&self) -> DbResult<StoreConnection<'_>> {
        // Each statement is atomic; a poisoned lock still guards a consistent database.
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        trace!("event=db_acquire module=db status=ok mode=memory");
        Ok(StoreConnection::Exclusive(guard))
    }

    fn mode(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}
