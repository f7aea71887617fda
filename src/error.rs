//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// SQLSTATE codes that are worth retrying with a fresh transaction.
const TRANSIENT_SQLSTATES: &[&str] = &[
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "57P01", // admin_shutdown
    "53300", // too_many_connections
];

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid setting {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("operation cancelled")]
    Cancelled,
}

impl AppError {
    /// True when re-running the whole transaction may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Db(e) => is_transient_db_error(e),
            _ => false,
        }
    }

    fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Db(sqlx::Error::Database(db)) => {
                db.code().as_deref() == Some(UNIQUE_VIOLATION)
            }
            _ => false,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        if self.is_unique_violation() {
            return (StatusCode::BAD_REQUEST, "conflict");
        }
        if self.is_transient() {
            return (StatusCode::SERVICE_UNAVAILABLE, "transient_database_error");
        }
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            // Duplicate ids and logins are reported as plain 400s.
            AppError::Conflict(_) => (StatusCode::BAD_REQUEST, "conflict"),
            AppError::Db(sqlx::Error::RowNotFound) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "cancelled"),
        }
    }
}

fn is_transient_db_error(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            // Class 08: connection exceptions.
            Some(code) => code.starts_with("08") || TRANSIENT_SQLSTATES.contains(&code),
            None => false,
        },
        _ => false,
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn io_errors_are_transient() {
        let err = AppError::Db(sqlx::Error::Io(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "reset",
        )));
        assert!(err.is_transient());
        assert_eq!(err.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn rejections_are_not_transient() {
        assert!(!AppError::NotFound("x".into()).is_transient());
        assert!(!AppError::BadRequest("x".into()).is_transient());
        assert!(!AppError::Conflict("x".into()).is_transient());
        assert!(!AppError::Db(sqlx::Error::RowNotFound).is_transient());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            AppError::NotFound("x".into()).status_and_code(),
            (StatusCode::NOT_FOUND, "not_found")
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_and_code(),
            (StatusCode::BAD_REQUEST, "conflict")
        );
        assert_eq!(
            AppError::Db(sqlx::Error::RowNotFound).status_and_code().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Cancelled.status_and_code().0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
