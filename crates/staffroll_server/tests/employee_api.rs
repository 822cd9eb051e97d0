use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use staffroll_core::db::{ConnectionProvider, DbError, DbResult, StoreConnection};
use staffroll_core::{EmployeeRepository, MemoryStore, NewEmployee, SqliteEmployeeRepository};
use staffroll_server::build_router;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    repo: Arc<SqliteEmployeeRepository<MemoryStore>>,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let repo = Arc::new(SqliteEmployeeRepository::new(MemoryStore::new().unwrap()));
        let router = build_router(repo.clone());
        Self { repo, router }
    }

    fn seeded() -> Self {
        let app = Self::new();
        for (name, department, salary) in [
            ("Alice", "Eng", 90000.0),
            ("Bob", "Ops", 60000.0),
            ("Carol", "Eng", 110000.0),
        ] {
            app.repo
                .add(&NewEmployee::new(name, department, salary))
                .unwrap();
        }
        app
    }

    async fn send(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let (status, _, json) = self.send_raw(method, uri, body).await;
        (status, json)
    }

    async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, axum::http::HeaderMap, Value) {
        call(&self.router, method, uri, body).await
    }
}

async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ORIGIN, "http://localhost:5173");
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

#[tokio::test]
async fn get_without_params_lists_all_in_id_order() {
    let app = TestApp::seeded();

    let (status, body) = app.send(Method::GET, "/api/employees", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    assert_eq!(
        body["data"][0],
        json!({"id": 1, "name": "Alice", "department": "Eng", "salary": 90000.0})
    );
}

#[tokio::test]
async fn get_empty_store_returns_empty_list() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/employees", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "data": []}));
}

#[tokio::test]
async fn average_salary_for_department() {
    let app = TestApp::seeded();

    let (status, body) = app
        .send(
            Method::GET,
            "/api/employees?action=avgSalary&department=Eng",
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "data": 100000.0}));

    let (_, empty) = app
        .send(
            Method::GET,
            "/api/employees?action=avgSalary&department=Nobody",
            None,
        )
        .await;
    assert_eq!(empty["data"], 0.0);
}

#[tokio::test]
async fn departments_are_sorted_and_distinct() {
    let app = TestApp::seeded();

    let (status, body) = app
        .send(Method::GET, "/api/employees?action=departments", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["Eng", "Ops"]));
}

#[tokio::test]
async fn get_by_id_and_not_found() {
    let app = TestApp::seeded();

    let (status, body) = app.send(Method::GET, "/api/employees?id=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Bob");

    let (status, body) = app.send(Method::GET, "/api/employees?id=999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "message": "Employee not found"})
    );
}

#[tokio::test]
async fn unparseable_id_is_bad_request() {
    let app = TestApp::seeded();

    let (status, body) = app.send(Method::GET, "/api/employees?id=abc", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid employee id `abc`");
}

#[tokio::test]
async fn department_filter_is_exact() {
    let app = TestApp::seeded();

    let (_, body) = app
        .send(Method::GET, "/api/employees?department=Eng", None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .send(Method::GET, "/api/employees?department=eng", None)
        .await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn avg_salary_without_department_falls_through_to_list() {
    let app = TestApp::seeded();

    let (status, body) = app
        .send(Method::GET, "/api/employees?action=avgSalary", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn post_creates_employee_with_generated_id() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/employees",
            Some(r#"{"name":"Alice","department":"Eng","salary":90000}"#),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Employee added successfully");
    assert_eq!(
        body["data"],
        json!({"id": 1, "name": "Alice", "department": "Eng", "salary": 90000.0})
    );
    assert_eq!(app.repo.count().unwrap(), 1);
}

#[tokio::test]
async fn post_rejects_malformed_and_incomplete_bodies() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::POST, "/api/employees", Some("{not json"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body:"));

    let (status, body) = app
        .send(
            Method::POST,
            "/api/employees",
            Some(r#"{"department":"Eng","salary":1}"#),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("missing field `name`"));

    let (status, _) = app
        .send(
            Method::POST,
            "/api/employees",
            Some(r#"{"name":"Alice","department":"Eng","salary":"lots"}"#),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/employees",
            Some(r#"{"name":"  ","department":"Eng","salary":1}"#),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "employee name must not be empty");

    assert_eq!(app.repo.count().unwrap(), 0);
}

#[tokio::test]
async fn post_with_duplicate_id_is_bad_request() {
    let app = TestApp::seeded();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/employees",
            Some(r#"{"id":1,"name":"Mallory","department":"Eng","salary":1}"#),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(app.repo.count().unwrap(), 3);
}

#[tokio::test]
async fn put_updates_existing_and_reports_missing() {
    let app = TestApp::seeded();

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/employees",
            Some(r#"{"id":2,"name":"Bobby","department":"Eng","salary":65000}"#),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Employee updated successfully");
    assert_eq!(body["data"]["name"], "Bobby");
    assert_eq!(app.repo.get_by_id(2).unwrap().unwrap().department, "Eng");

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/employees",
            Some(r#"{"id":999,"name":"Ghost","department":"Eng","salary":1}"#),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/employees",
            Some(r#"{"name":"NoId","department":"Eng","salary":1}"#),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_by_id() {
    let app = TestApp::seeded();

    let (status, body) = app.send(Method::DELETE, "/api/employees?id=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Employee deleted successfully"})
    );

    let (status, body) = app.send(Method::DELETE, "/api/employees?id=1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = app.send(Method::DELETE, "/api/employees", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Employee ID is required");

    let (status, _) = app.send(Method::DELETE, "/api/employees?id=x1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.repo.count().unwrap(), 2);
}

#[tokio::test]
async fn every_response_allows_any_origin() {
    let app = TestApp::seeded();

    for (method, uri) in [
        (Method::GET, "/api/employees"),
        (Method::GET, "/api/employees?id=999"),
        (Method::DELETE, "/api/employees"),
        (Method::GET, "/nowhere"),
    ] {
        let (_, headers, _) = app.send_raw(method, uri, None).await;
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap()
                .to_str()
                .unwrap(),
            "*",
            "missing CORS header for {uri}"
        );
    }
}

#[tokio::test]
async fn options_returns_preflight_headers() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/employees")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_string();
    for method in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
        assert!(methods.contains(method), "{method} missing from {methods}");
    }
    assert!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .contains("content-type"));
}

#[tokio::test]
async fn unknown_route_and_method_use_envelope() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = app.send(Method::PATCH, "/api/employees", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);

    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

/// Provider whose store is permanently unreachable.
struct UnreachableStore;

impl ConnectionProvider for UnreachableStore {
    fn acquire(&self) -> DbResult<StoreConnection<'_>> {
        Err(DbError::Io {
            path: PathBuf::from("/unreachable"),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "store offline"),
        })
    }

    fn mode(&self) -> &'static str {
        "unreachable"
    }
}

#[tokio::test]
async fn store_faults_are_server_errors_not_empty_results() {
    let router = build_router(Arc::new(SqliteEmployeeRepository::new(UnreachableStore)));

    for uri in [
        "/api/employees",
        "/api/employees?action=avgSalary&department=Eng",
        "/api/employees?action=departments",
        "/api/employees?id=1",
    ] {
        let (status, headers, body) = call(&router, Method::GET, uri, None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["success"], false);
        assert!(body.get("data").is_none(), "{uri} reported data {body}");
        assert!(body["message"].as_str().unwrap().starts_with("Error: "));
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    let (status, _, body) = call(
        &router,
        Method::POST,
        "/api/employees",
        Some(r#"{"name":"Alice","department":"Eng","salary":1}"#),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_store_handles_concurrent_requests() {
    let app = TestApp::new();

    let requests: Vec<_> = (0..200)
        .map(|index| {
            let router = app.router.clone();
            tokio::spawn(async move {
                if index % 2 == 0 {
                    let body = format!(r#"{{"name":"E{index}","department":"Eng","salary":1}}"#);
                    call(&router, Method::POST, "/api/employees", Some(body.as_str())).await
                } else {
                    call(&router, Method::GET, "/api/employees", None).await
                }
            })
        })
        .collect();

    for request in requests {
        let (status, _, body) = request.await.unwrap();
        assert!(status.is_success(), "{status} {body}");
    }
    assert_eq!(app.repo.count().unwrap(), 100);
}
