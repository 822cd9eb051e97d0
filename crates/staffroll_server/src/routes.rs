//! Employee HTTP Routes
//!
//! One resource path, `/api/employees`, dispatched on method and query string.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use staffroll_core::{Employee, EmployeeId, EmployeeRepository, NewEmployee, RepoResult};

use crate::response::{ApiError, ApiResult, Envelope};

pub const EMPLOYEES_PATH: &str = "/api/employees";

pub type SharedRepository = Arc<dyn EmployeeRepository + Send + Sync>;

/// State shared across employee handlers.
#[derive(Clone)]
pub struct EmployeeState {
    pub repo: SharedRepository,
}

impl EmployeeState {
    pub fn new(repo: SharedRepository) -> Self {
        Self { repo }
    }

    /// Runs a repository call on the blocking pool; SQLite calls block.
    async fn run<T, F>(&self, op: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn EmployeeRepository) -> RepoResult<T> + Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || op(repo.as_ref()))
            .await
            .map_err(|err| ApiError::Internal(format!("repository task failed: {err}")))?
            .map_err(ApiError::from)
    }
}

/// Raw query parameters. `id` stays textual so parse failures become 400s.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EmployeeQuery {
    pub action: Option<String>,
    pub department: Option<String>,
    pub id: Option<String>,
}

/// GET branch selected from the query string.
#[derive(Debug, Clone, PartialEq)]
pub enum GetRoute {
    Departments,
    AverageSalary(String),
    ById(EmployeeId),
    ByDepartment(String),
    All,
}

impl GetRoute {
    /// Picks the branch in precedence order: departments, avgSalary (only
    /// with a department), id, department, everything.
    pub fn resolve(query: EmployeeQuery) -> ApiResult<Self> {
        let EmployeeQuery {
            action,
            department,
            id,
        } = query;

        match (action.as_deref(), department) {
            (Some("departments"), _) => Ok(Self::Departments),
            (Some("avgSalary"), Some(department)) => Ok(Self::AverageSalary(department)),
            (_, department) => match (id, department) {
                (Some(raw), _) => parse_id(&raw).map(Self::ById),
                (None, Some(department)) => Ok(Self::ByDepartment(department)),
                (None, None) => Ok(Self::All),
            },
        }
    }
}

/// Create employee routes
pub fn employee_routes(state: EmployeeState) -> Router {
    Router::new()
        .route(
            EMPLOYEES_PATH,
            get(get_employees_handler)
                .post(create_employee_handler)
                .put(update_employee_handler)
                .delete(delete_employee_handler)
                .fallback(method_not_allowed_handler),
        )
        .with_state(state)
}

async fn get_employees_handler(
    State(state): State<EmployeeState>,
    query: Result<Query<EmployeeQuery>, QueryRejection>,
) -> ApiResult<axum::response::Response> {
    let response = match GetRoute::resolve(query_params(query)?)? {
        GetRoute::Departments => {
            let departments = state.run(|repo| repo.list_departments()).await?;
            Json(Envelope::data(departments)).into_response()
        }
        GetRoute::AverageSalary(department) => {
            let average = state
                .run(move |repo| repo.average_salary(&department))
                .await?;
            Json(Envelope::data(average)).into_response()
        }
        GetRoute::ById(id) => {
            let employee = state
                .run(move |repo| repo.get_by_id(id))
                .await?
                .ok_or(ApiError::EmployeeNotFound)?;
            Json(Envelope::data(employee)).into_response()
        }
        GetRoute::ByDepartment(department) => {
            let employees = state
                .run(move |repo| repo.list_by_department(&department))
                .await?;
            Json(Envelope::data(employees)).into_response()
        }
        GetRoute::All => {
            let employees = state.run(|repo| repo.list_all()).await?;
            Json(Envelope::data(employees)).into_response()
        }
    };
    Ok(response)
}

async fn create_employee_handler(
    State(state): State<EmployeeState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Envelope<Employee>>)> {
    let payload: NewEmployee = parse_body(&body)?;
    payload
        .validate()
        .map_err(|err| ApiError::Rejected(err.to_string()))?;

    let stored = state.run(move |repo| repo.add(&payload)).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::data_with_message(
            stored,
            "Employee added successfully",
        )),
    ))
}

async fn update_employee_handler(
    State(state): State<EmployeeState>,
    body: Bytes,
) -> ApiResult<Json<Envelope<Employee>>> {
    let employee: Employee = parse_body(&body)?;
    employee
        .validate()
        .map_err(|err| ApiError::Rejected(err.to_string()))?;

    let candidate = employee.clone();
    let updated = state.run(move |repo| repo.update(&candidate)).await?;
    if !updated {
        return Err(ApiError::EmployeeNotFound);
    }
    Ok(Json(Envelope::data_with_message(
        employee,
        "Employee updated successfully",
    )))
}

async fn delete_employee_handler(
    State(state): State<EmployeeState>,
    query: Result<Query<EmployeeQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<()>>> {
    let raw = query_params(query)?
        .id
        .ok_or(ApiError::MissingParam("Employee ID is required"))?;
    let id = parse_id(&raw)?;

    if !state.run(move |repo| repo.delete(id)).await? {
        return Err(ApiError::EmployeeNotFound);
    }
    Ok(Json(Envelope::message("Employee deleted successfully")))
}

async fn method_not_allowed_handler() -> ApiError {
    ApiError::MethodNotAllowed
}

fn query_params(query: Result<Query<EmployeeQuery>, QueryRejection>) -> ApiResult<EmployeeQuery> {
    query
        .map(|Query(params)| params)
        .map_err(|err| ApiError::InvalidQuery(err.body_text()))
}

fn parse_id(raw: &str) -> ApiResult<EmployeeId> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::InvalidId(raw.to_string()))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|err| ApiError::InvalidBody(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(action: Option<&str>, department: Option<&str>, id: Option<&str>) -> EmployeeQuery {
        EmployeeQuery {
            action: action.map(str::to_string),
            department: department.map(str::to_string),
            id: id.map(str::to_string),
        }
    }

    #[test]
    fn resolve_follows_branch_precedence() {
        assert_eq!(
            GetRoute::resolve(query(Some("departments"), Some("Eng"), Some("1"))).unwrap(),
            GetRoute::Departments
        );
        assert_eq!(
            GetRoute::resolve(query(Some("avgSalary"), Some("Eng"), Some("1"))).unwrap(),
            GetRoute::AverageSalary("Eng".to_string())
        );
        assert_eq!(
            GetRoute::resolve(query(None, Some("Eng"), Some("7"))).unwrap(),
            GetRoute::ById(7)
        );
        assert_eq!(
            GetRoute::resolve(query(None, Some("Eng"), None)).unwrap(),
            GetRoute::ByDepartment("Eng".to_string())
        );
        assert_eq!(GetRoute::resolve(query(None, None, None)).unwrap(), GetRoute::All);
    }

    #[test]
    fn avg_salary_without_department_falls_through() {
        assert_eq!(
            GetRoute::resolve(query(Some("avgSalary"), None, None)).unwrap(),
            GetRoute::All
        );
        assert_eq!(
            GetRoute::resolve(query(Some("avgSalary"), None, Some("3"))).unwrap(),
            GetRoute::ById(3)
        );
        assert_eq!(
            GetRoute::resolve(query(Some("unknown"), Some("Ops"), None)).unwrap(),
            GetRoute::ByDepartment("Ops".to_string())
        );
    }

    #[test]
    fn resolve_rejects_unparseable_id() {
        let err = GetRoute::resolve(query(None, None, Some("abc"))).unwrap_err();
        assert!(matches!(err, ApiError::InvalidId(ref raw) if raw == "abc"));
        assert_eq!(err.to_string(), "Invalid employee id `abc`");
    }
}
