//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service and transport layers.
//!
//! # Invariants
//! - Repository writes must run `validate()` on their payload before persistence.
//! - Absent rows are ordinary results (`Option`/`bool`); only validation and
//!   store failures surface as `RepoError`.

pub mod employee_repo;
