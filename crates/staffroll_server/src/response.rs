//! # Response Envelope
//!
//! Every response body is `{"success": bool, "data"?: .., "message"?: ..}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::{Deserialize, Serialize};
use staffroll_core::RepoError;
use thiserror::Error;

/// Uniform JSON wrapper for all routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn data_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Request-boundary errors and their status mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Invalid employee id `{0}`")]
    InvalidId(String),

    #[error("{0}")]
    MissingParam(&'static str),

    #[error("{0}")]
    Rejected(String),

    // 404
    #[error("Employee not found")]
    EmployeeNotFound,

    #[error("Resource not found")]
    RouteNotFound,

    // 405
    #[error("Method not allowed")]
    MethodNotAllowed,

    // 500
    #[error("Error: {0}")]
    Store(String),

    #[error("Error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_)
            | Self::InvalidQuery(_)
            | Self::InvalidId(_)
            | Self::MissingParam(_)
            | Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::EmployeeNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        if err.is_caller_error() {
            Self::Rejected(err.to_string())
        } else {
            Self::Store(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(
                "event=http_error module=http status={} error={}",
                status.as_u16(),
                self
            );
        }
        (status, Json(Envelope::failure(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staffroll_core::EmployeeValidationError;

    #[test]
    fn failure_envelope_omits_data() {
        let json = serde_json::to_value(Envelope::failure("Employee not found")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "Employee not found"})
        );
    }

    #[test]
    fn data_envelope_omits_message() {
        let json = serde_json::to_value(Envelope::data(100000.0)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 100000.0}));
    }

    #[test]
    fn repo_errors_map_to_status_codes() {
        let rejected = ApiError::from(RepoError::Validation(EmployeeValidationError::EmptyName));
        assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);

        let duplicate = ApiError::from(RepoError::Constraint("UNIQUE constraint failed".into()));
        assert_eq!(duplicate.status_code(), StatusCode::BAD_REQUEST);

        let broken = ApiError::from(RepoError::InvalidData("null salary".into()));
        assert_eq!(broken.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(broken.to_string().starts_with("Error: "));
    }
}
