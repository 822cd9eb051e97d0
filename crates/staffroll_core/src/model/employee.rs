//! Employee domain model.
//!
//! # Responsibility
//! - Define the stored employee record and the insert payload.
//! - Validate caller input before it reaches SQL.
//!
//! # Invariants
//! - `id` identifies exactly one stored row and is never reused by the store.
//! - `name` and `department` are non-blank.
//! - `salary` is finite. Negative values are allowed; non-negativity is a
//!   convention only.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary key of a stored employee row.
pub type EmployeeId = i64;

/// Validation failures for employee write payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeValidationError {
    EmptyName,
    EmptyDepartment,
    NonFiniteSalary,
    NonPositiveId(EmployeeId),
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "employee name must not be empty"),
            Self::EmptyDepartment => write!(f, "employee department must not be empty"),
            Self::NonFiniteSalary => write!(f, "employee salary must be a finite number"),
            Self::NonPositiveId(id) => write!(f, "employee id must be positive, got {id}"),
        }
    }
}

impl Error for EmployeeValidationError {}

/// A stored employee row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    /// Free-form grouping key; there is no separate department entity.
    pub department: String,
    pub salary: f64,
}

impl Employee {
    pub fn new(
        id: EmployeeId,
        name: impl Into<String>,
        department: impl Into<String>,
        salary: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            department: department.into(),
            salary,
        }
    }

    /// Validates this record for a full-record update.
    ///
    /// The id itself is not checked: an unknown or non-positive id simply
    /// matches no row.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        validate_fields(&self.name, &self.department, self.salary)
    }
}

/// Insert payload. `id` is generated by the store unless supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EmployeeId>,
    pub name: String,
    pub department: String,
    pub salary: f64,
}

impl NewEmployee {
    /// Creates a payload whose id will be assigned by the store.
    pub fn new(name: impl Into<String>, department: impl Into<String>, salary: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            department: department.into(),
            salary,
        }
    }

    /// Creates a payload with a caller-supplied id.
    pub fn with_id(
        id: EmployeeId,
        name: impl Into<String>,
        department: impl Into<String>,
        salary: f64,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::new(name, department, salary)
        }
    }

    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        if let Some(id) = self.id {
            if id <= 0 {
                return Err(EmployeeValidationError::NonPositiveId(id));
            }
        }
        validate_fields(&self.name, &self.department, self.salary)
    }

    /// Builds the stored record once the store has settled the id.
    pub fn into_employee(self, id: EmployeeId) -> Employee {
        Employee {
            id,
            name: self.name,
            department: self.department,
            salary: self.salary,
        }
    }
}

fn validate_fields(
    name: &str,
    department: &str,
    salary: f64,
) -> Result<(), EmployeeValidationError> {
    if name.trim().is_empty() {
        return Err(EmployeeValidationError::EmptyName);
    }
    if department.trim().is_empty() {
        return Err(EmployeeValidationError::EmptyDepartment);
    }
    // SQLite stores NaN as NULL, which the NOT NULL column rejects.
    if !salary.is_finite() {
        return Err(EmployeeValidationError::NonFiniteSalary);
    }
    Ok(())
}
