//! JSON-over-HTTP surface for the employee repository.
//!
//! Routes (all responses use the `{success, data?, message?}` envelope and
//! carry `Access-Control-Allow-Origin: *`):
//! - `GET /api/employees[?action=departments|action=avgSalary&department=D|id=N|department=D]`
//! - `POST /api/employees`, `PUT /api/employees`, `DELETE /api/employees?id=N`
//! - `OPTIONS /api/employees` (CORS preflight)
//! - `GET /health`

pub mod response;
pub mod routes;
pub mod server;

pub use response::{ApiError, ApiResult, Envelope};
pub use routes::{employee_routes, EmployeeState, SharedRepository, EMPLOYEES_PATH};
pub use server::{build_router, HttpServer};
