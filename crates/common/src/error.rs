//! Error types for gymhub.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// `PostgreSQL` SQLSTATE codes the service distinguishes.
pub mod sqlstate {
    /// `insufficient_privilege`
    pub const INSUFFICIENT_PRIVILEGE: &str = "42501";
    /// `unique_violation`
    pub const UNIQUE_VIOLATION: &str = "23505";
    /// `foreign_key_violation`
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    /// `undefined_column`
    pub const UNDEFINED_COLUMN: &str = "42703";
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) | Self::InvalidTransition(_) => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Classify a database error by its SQLSTATE code.
    ///
    /// Permission and constraint failures become client errors so the
    /// caller sees why a write was refused instead of a bare 500.
    #[must_use]
    pub fn from_db(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(what) = &err {
            return Self::NotFound(what.clone());
        }
        match sqlstate_of(&err) {
            Some(code) => Self::from_sqlstate(&code, &err.to_string()),
            None => Self::Database(err.to_string()),
        }
    }

    /// Map a SQLSTATE code and driver message to an application error.
    #[must_use]
    pub fn from_sqlstate(code: &str, message: &str) -> Self {
        match code {
            sqlstate::INSUFFICIENT_PRIVILEGE => {
                Self::Forbidden("Permission denied by the database".to_string())
            }
            sqlstate::UNIQUE_VIOLATION => Self::Conflict(format!("Duplicate record: {message}")),
            sqlstate::FOREIGN_KEY_VIOLATION => {
                Self::Conflict(format!("Referenced record missing or in use: {message}"))
            }
            sqlstate::UNDEFINED_COLUMN => {
                Self::Database(format!("Schema out of date, run migrations: {message}"))
            }
            _ => Self::Database(message.to_string()),
        }
    }
}

fn sqlstate_of(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Exec(e) | DbErr::Query(e) | DbErr::Conn(e) => e,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(e) => e
            .as_database_error()
            .and_then(|d| d.code())
            .map(|c| c.into_owned()),
        RuntimeErr::Internal(_) => None,
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        Self::from_db(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlstate_permission_denied_is_forbidden() {
        let err = AppError::from_sqlstate("42501", "permission denied for table gym");
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_sqlstate_unique_violation_is_conflict() {
        let err = AppError::from_sqlstate("23505", "duplicate key value");
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn test_sqlstate_undefined_column_is_server_error() {
        let err = AppError::from_sqlstate("42703", "column \"website\" does not exist");
        assert!(err.is_server_error());
        assert!(err.to_string().contains("migrations"));
    }

    #[test]
    fn test_unknown_sqlstate_stays_database() {
        let err = AppError::from_sqlstate("XX000", "boom");
        assert!(matches!(err, AppError::Database(ref m) if m == "boom"));
    }

    #[test]
    fn test_record_not_found_maps_to_not_found() {
        let err = AppError::from(DbErr::RecordNotFound("gym".to_string()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_transition_is_conflict() {
        let err = AppError::InvalidTransition("approved -> rejected".to_string());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }
}
