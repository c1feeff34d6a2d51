//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every service operation, policy check and store call reports failure through it, so
//! handlers can simply propagate with `?`.
//!
//! `AppError` implements `actix_web::error::ResponseError` to turn each variant into the
//! matching HTTP status with a JSON body. Internal failures (database, hashing, config)
//! are logged with their detail and rendered to the caller as an opaque message.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Result alias used by services, stores and handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The request carries no valid identity (HTTP 401).
    /// Checked before every other outcome by `AuthMiddleware`.
    Unauthorized(String),
    /// The actor is authenticated but lacks the relationship the action requires (HTTP 403).
    Forbidden(String),
    /// A malformed request that is not a data-model violation (HTTP 400).
    BadRequest(String),
    /// A referenced board, task, comment or user does not exist (HTTP 404).
    NotFound(String),
    /// The endpoint exists but the operation is intentionally disabled (HTTP 405).
    MethodNotAllowed(String),
    /// The payload violates a data-model invariant (HTTP 422).
    /// The message always names the offending ids or fields.
    ValidationError(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// An error originating from the store (HTTP 500).
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::MethodNotAllowed(msg) => write!(f, "Method Not Allowed: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Builds a `NotFound` for an entity kind and id, e.g. `Board 4 not found`.
    pub fn not_found(kind: &str, id: i32) -> Self {
        AppError::NotFound(format!("{} {} not found", kind, id))
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::InternalServerError(detail) | AppError::DatabaseError(detail) => {
                log::error!("{}", detail);
                "Internal server error"
            }
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::MethodNotAllowed(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
        };
        HttpResponse::build(self.status_code()).json(json!({
            "error": message
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`, everything else
/// becomes `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(format!("Migration failed: {}", error))
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
