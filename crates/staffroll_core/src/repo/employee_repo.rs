//! Employee repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and aggregate queries over the `employees` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every caller-provided value is bound as a statement parameter; SQL text
//!   is never assembled from input.
//! - Write paths validate their payload before any SQL runs.
//! - A missing row is reported as `None`/`false`, never as an error.
//! - Each operation acquires its own connection and releases it on return.

use crate::db::{ConnectionProvider, DbError, StoreConnection};
use crate::model::employee::{Employee, EmployeeId, EmployeeValidationError, NewEmployee};
use log::{debug, info};
use rusqlite::{params, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    name,
    department,
    salary
FROM employees";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for employee persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Payload rejected before reaching the store.
    Validation(EmployeeValidationError),
    /// Store unreachable or statement failed.
    Db(DbError),
    /// The store rejected a write because of a constraint (e.g. duplicate id).
    Constraint(String),
    /// A persisted row could not be mapped to an `Employee`.
    InvalidData(String),
}

impl RepoError {
    /// Whether the failure was caused by the caller's input rather than the store.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Constraint(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Constraint(message) => write!(f, "write rejected by store: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted employee data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Constraint(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if value.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            return Self::Constraint(value.to_string());
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for employee CRUD and query operations.
pub trait EmployeeRepository {
    /// All employees ordered by id.
    fn list_all(&self) -> RepoResult<Vec<Employee>>;
    /// Employees whose department equals `department` exactly (case-sensitive).
    fn list_by_department(&self, department: &str) -> RepoResult<Vec<Employee>>;
    /// Mean salary of `department`; `0.0` when it has no employees.
    fn average_salary(&self, department: &str) -> RepoResult<f64>;
    fn get_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    /// Inserts a row and returns it with its settled id.
    fn add(&self, employee: &NewEmployee) -> RepoResult<Employee>;
    /// Replaces name, department and salary. Returns whether a row matched.
    fn update(&self, employee: &Employee) -> RepoResult<bool>;
    /// Replaces only the salary. Returns whether a row matched.
    fn update_salary(&self, id: EmployeeId, salary: f64) -> RepoResult<bool>;
    /// Returns whether a row was removed.
    fn delete(&self, id: EmployeeId) -> RepoResult<bool>;
    /// Distinct departments, sorted ascending.
    fn list_departments(&self) -> RepoResult<Vec<String>>;
    fn count(&self) -> RepoResult<u64>;
}

impl<R: EmployeeRepository + ?Sized> EmployeeRepository for std::sync::Arc<R> {
    fn list_all(&self) -> RepoResult<Vec<Employee>> {
        (**self).list_all()
    }

    fn list_by_department(&self, department: &str) -> RepoResult<Vec<Employee>> {
        (**self).list_by_department(department)
    }

    fn average_salary(&self, department: &str) -> RepoResult<f64> {
        (**self).average_salary(department)
    }

    fn get_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        (**self).get_by_id(id)
    }

    fn add(&self, employee: &NewEmployee) -> RepoResult<Employee> {
        (**self).add(employee)
    }

    fn update(&self, employee: &Employee) -> RepoResult<bool> {
        (**self).update(employee)
    }

    fn update_salary(&self, id: EmployeeId, salary: f64) -> RepoResult<bool> {
        (**self).update_salary(id, salary)
    }

    fn delete(&self, id: EmployeeId) -> RepoResult<bool> {
        (**self).delete(id)
    }

    fn list_departments(&self) -> RepoResult<Vec<String>> {
        (**self).list_departments()
    }

    fn count(&self) -> RepoResult<u64> {
        (**self).count()
    }
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<P: ConnectionProvider> {
    store: P,
}

impl<P: ConnectionProvider> SqliteEmployeeRepository<P> {
    pub fn new(store: P) -> Self {
        Self { store }
    }

    /// Returns the injected connection provider.
    pub fn store(&self) -> &P {
        &self.store
    }

    fn connection(&self) -> RepoResult<StoreConnection<'_>> {
        Ok(self.store.acquire()?)
    }

    fn query_employees(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Employee>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut employees = Vec::new();

        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        Ok(employees)
    }
}

impl<P: ConnectionProvider> EmployeeRepository for SqliteEmployeeRepository<P> {
    fn list_all(&self) -> RepoResult<Vec<Employee>> {
        self.query_employees(&format!("{EMPLOYEE_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn list_by_department(&self, department: &str) -> RepoResult<Vec<Employee>> {
        self.query_employees(
            &format!("{EMPLOYEE_SELECT_SQL} WHERE department = ?1 ORDER BY id ASC;"),
            [department],
        )
    }

    fn average_salary(&self, department: &str) -> RepoResult<f64> {
        let conn = self.connection()?;
        // AVG over an empty set is NULL.
        let average: Option<f64> = conn.query_row(
            "SELECT AVG(salary) FROM employees WHERE department = ?1;",
            [department],
            |row| row.get(0),
        )?;
        Ok(average.unwrap_or(0.0))
    }

    fn get_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }

        Ok(None)
    }

    fn add(&self, employee: &NewEmployee) -> RepoResult<Employee> {
        employee.validate()?;

        let conn = self.connection()?;
        // A NULL id lets SQLite assign the next rowid.
        conn.execute(
            "INSERT INTO employees (
                id,
                name,
                department,
                salary
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                employee.id,
                employee.name.as_str(),
                employee.department.as_str(),
                employee.salary,
            ],
        )?;
        let id = conn.last_insert_rowid();

        info!("event=employee_add module=repo status=ok id={id}");
        Ok(employee.clone().into_employee(id))
    }

    fn update(&self, employee: &Employee) -> RepoResult<bool> {
        employee.validate()?;

        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE employees
             SET
                name = ?1,
                department = ?2,
                salary = ?3
             WHERE id = ?4;",
            params![
                employee.name.as_str(),
                employee.department.as_str(),
                employee.salary,
                employee.id,
            ],
        )?;

        log_write("employee_update", employee.id, changed);
        Ok(changed > 0)
    }

    fn update_salary(&self, id: EmployeeId, salary: f64) -> RepoResult<bool> {
        if !salary.is_finite() {
            return Err(EmployeeValidationError::NonFiniteSalary.into());
        }

        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE employees SET salary = ?1 WHERE id = ?2;",
            params![salary, id],
        )?;

        log_write("employee_update_salary", id, changed);
        Ok(changed > 0)
    }

    fn delete(&self, id: EmployeeId) -> RepoResult<bool> {
        let conn = self.connection()?;
        let changed = conn.execute("DELETE FROM employees WHERE id = ?1;", [id])?;

        log_write("employee_delete", id, changed);
        Ok(changed > 0)
    }

    fn list_departments(&self) -> RepoResult<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT department
             FROM employees
             ORDER BY department ASC;",
        )?;
        let departments = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(departments)
    }

    fn count(&self) -> RepoResult<u64> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let id: EmployeeId = row.get("id")?;
    let salary = row.get::<_, Option<f64>>("salary")?.ok_or_else(|| {
        RepoError::InvalidData(format!("null salary for employee `{id}` in employees.salary"))
    })?;

    Ok(Employee {
        id,
        name: row.get("name")?,
        department: row.get("department")?,
        salary,
    })
}

fn log_write(event: &str, id: EmployeeId, changed: usize) {
    if changed > 0 {
        info!("event={event} module=repo status=ok id={id}");
    } else {
        debug!("event={event} module=repo status=noop id={id}");
    }
}
