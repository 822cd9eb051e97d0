//! Domain model for employee records.
//!
//! # Responsibility
//! - Define the canonical data structures shared by the repository, the HTTP
//!   handler and the interactive clients.
//!
//! # Invariants
//! - Every stored employee is identified by a store-unique `EmployeeId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod employee;
