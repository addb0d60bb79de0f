// src/error.rs

use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt;

use crate::utils::html;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict: the storage layer rejected a write (duplicate username,
    // duplicate follow, dangling foreign key).
    Conflict(String),
}

impl AppError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Renders the error as a small HTML page with the matching status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        (status, Html(html::error_page(status, &error_message))).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Integrity violations surface as `Conflict` so callers can tell a duplicate
/// username apart from a broken database.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                AppError::Conflict(db_err.message().to_string())
            }
            _ => AppError::InternalServerError(err.to_string()),
        }
    }
}

/// A path segment that does not parse (`/users/abc`) names no resource.
impl From<PathRejection> for AppError {
    fn from(err: PathRejection) -> Self {
        tracing::debug!("Unmatched path parameter: {}", err.body_text());
        AppError::NotFound("Page not found".to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
