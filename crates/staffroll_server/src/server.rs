//! # HTTP Server
//!
//! Combines the employee routes with health, fallback, request logging and CORS.

use std::future::Future;
use std::io;
use std::time::Instant;

use axum::{
    extract::Request,
    http::{header, Method},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use log::{info, warn};
use staffroll_core::config::HttpConfig;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::response::{ApiError, Envelope};
use crate::routes::{employee_routes, EmployeeState, SharedRepository};

/// HTTP server for the employee API.
pub struct HttpServer {
    config: HttpConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpConfig, repo: SharedRepository) -> Self {
        let router = build_router(repo);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serves until Ctrl-C is received.
    pub async fn start(self) -> io::Result<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Binds the configured host, which may be a name, an IPv4 or an IPv6 address.
    pub async fn bind(&self) -> io::Result<TcpListener> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|err| {
                io::Error::new(
                    err.kind(),
                    format!("cannot listen on {}: {err}", self.socket_addr()),
                )
            })?;
        info!(
            "event=http_listen module=http status=ok addr={}",
            listener.local_addr()?
        );
        Ok(listener)
    }

    /// Serves on `listener` until `shutdown` completes.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("event=http_shutdown module=http status=ok");
        Ok(())
    }
}

/// Builds the full router: employee resource, health check, envelope 404s,
/// per-request logging and permissive CORS.
pub fn build_router(repo: SharedRepository) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .merge(employee_routes(EmployeeState::new(repo)))
        .fallback(route_not_found_handler)
        .layer(middleware::from_fn(log_request))
        .layer(cors)
}

async fn health_handler() -> Json<Envelope<()>> {
    Json(Envelope::message("ok"))
}

async fn route_not_found_handler() -> ApiError {
    ApiError::RouteNotFound
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let route = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        warn!(
            "event=http_request module=http method={method} route={route} status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    } else {
        info!(
            "event=http_request module=http method={method} route={route} status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    }
    response
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=http_shutdown module=http status=error error={err}");
    }
}
