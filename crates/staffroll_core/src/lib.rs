//! Core domain logic for Staffroll.
//! This crate is the single source of truth for employee record invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use db::{ConnectionProvider, DbError, FileStore, MemoryStore};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::employee::{Employee, EmployeeId, EmployeeValidationError, NewEmployee};
pub use repo::employee_repo::{EmployeeRepository, RepoError, RepoResult, SqliteEmployeeRepository};
pub use service::employee_service::{EmployeeService, FailurePolicy, ReadOutcome};

/// Opens the configured SQLite file and returns a repository over it.
pub fn open_repository(
    config: &AppConfig,
) -> Result<SqliteEmployeeRepository<FileStore>, Box<dyn std::error::Error + Send + Sync>> {
    let path = config.database_path()?;
    let store = FileStore::open(path, config.store.busy_timeout())?;
    Ok(SqliteEmployeeRepository::new(store))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
