//! Employee use-case service for interactive clients.
//!
//! # Responsibility
//! - Provide the CRUD entry points used by the console and desktop clients.
//! - Apply the configured read-failure policy in one place.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - A fallback read is always marked as such; it can never be mistaken for
//!   a real empty result.
//! - Write failures always propagate, whatever the policy.

use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::repo::employee_repo::{EmployeeRepository, RepoError, RepoResult};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// How read operations react to store faults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the store error to the caller.
    #[default]
    Surface,
    /// Log the error and hand back an empty/default value marked as fallback.
    Fallback,
}

impl FailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Surface => "surface",
            Self::Fallback => "fallback",
        }
    }
}

impl Display for FailurePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "surface" => Ok(Self::Surface),
            "fallback" => Ok(Self::Fallback),
            other => Err(format!(
                "unsupported store error policy `{other}`; expected surface|fallback"
            )),
        }
    }
}

/// Result of a read under the active failure policy.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    /// Value read from the store.
    Fresh(T),
    /// Default value substituted for a failed read.
    Fallback { value: T, cause: String },
}

impl<T> ReadOutcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Fresh(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Fresh(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// The store error message behind a fallback value.
    pub fn fallback_cause(&self) -> Option<&str> {
        match self {
            Self::Fresh(_) => None,
            Self::Fallback { cause, .. } => Some(cause.as_str()),
        }
    }
}

/// Use-case service wrapper for employee operations.
pub struct EmployeeService<R: EmployeeRepository> {
    repo: R,
    policy: FailurePolicy,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    /// Creates a service that surfaces every store error.
    pub fn new(repo: R) -> Self {
        Self::with_policy(repo, FailurePolicy::Surface)
    }

    pub fn with_policy(repo: R, policy: FailurePolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn list_all(&self) -> RepoResult<ReadOutcome<Vec<Employee>>> {
        self.read("list_all", self.repo.list_all())
    }

    pub fn list_by_department(&self, department: &str) -> RepoResult<ReadOutcome<Vec<Employee>>> {
        self.read("list_by_department", self.repo.list_by_department(department))
    }

    pub fn average_salary(&self, department: &str) -> RepoResult<ReadOutcome<f64>> {
        self.read("average_salary", self.repo.average_salary(department))
    }

    pub fn get_by_id(&self, id: EmployeeId) -> RepoResult<ReadOutcome<Option<Employee>>> {
        self.read("get_by_id", self.repo.get_by_id(id))
    }

    pub fn list_departments(&self) -> RepoResult<ReadOutcome<Vec<String>>> {
        self.read("list_departments", self.repo.list_departments())
    }

    pub fn count(&self) -> RepoResult<ReadOutcome<u64>> {
        self.read("count", self.repo.count())
    }

    pub fn add(&self, employee: &NewEmployee) -> RepoResult<Employee> {
        self.repo.add(employee)
    }

    pub fn update(&self, employee: &Employee) -> RepoResult<bool> {
        self.repo.update(employee)
    }

    pub fn update_salary(&self, id: EmployeeId, salary: f64) -> RepoResult<bool> {
        self.repo.update_salary(id, salary)
    }

    pub fn delete(&self, id: EmployeeId) -> RepoResult<bool> {
        self.repo.delete(id)
    }

    fn read<T: Default>(&self, op: &str, result: RepoResult<T>) -> RepoResult<ReadOutcome<T>> {
        match result {
            Ok(value) => Ok(ReadOutcome::Fresh(value)),
            Err(err @ RepoError::Validation(_)) => Err(err),
            Err(err) => match self.policy {
                FailurePolicy::Surface => Err(err),
                FailurePolicy::Fallback => {
                    warn!(
                        "event=employee_read module=service status=fallback op={op} error={err}"
                    );
                    Ok(ReadOutcome::Fallback {
                        value: T::default(),
                        cause: err.to_string(),
                    })
                }
            },
        }
    }
}
