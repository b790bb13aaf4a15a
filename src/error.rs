//!
//! # Custom Error Handling
//!
//! This module defines the `AppError` type used throughout the application.
//! Every failure a request can hit, from a rejected bearer token to a broken
//! database connection, ends up as one of its variants.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers and
//! middleware can return it directly and get the standard JSON envelope
//! (`{ "success": false, "message": ..., "errors": [...] }`) with the right
//! status code. `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error` and
//! `bcrypt::BcryptError` keep the `?` operator usable everywhere.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidationErrors;

use crate::models::ApiResponse;

/// A single field-level validation failure, reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or invalid input (HTTP 400), with per-field detail.
    ValidationError(Vec<FieldError>),
    /// A client error that is not tied to a specific field (HTTP 400).
    BadRequest(String),
    /// Missing, invalid or expired credentials (HTTP 401).
    Unauthorized(String),
    /// Authenticated, but not allowed to perform the operation (HTTP 403).
    Forbidden(String),
    /// An admin tried to delete their own account (HTTP 403).
    SelfDeletion,
    /// The requested resource does not exist (HTTP 404).
    NotFound(String),
    /// Duplicate username or email (HTTP 400), naming the offending field.
    Conflict(FieldError),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// Failure reported by the store (HTTP 500).
    DatabaseError(String),
}

impl AppError {
    pub fn conflict(field: &str, message: impl Into<String>) -> Self {
        AppError::Conflict(FieldError {
            field: field.to_string(),
            message: message.into(),
        })
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                write!(f, "Validation Error: {}", fields.join(", "))
            }
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::SelfDeletion => write!(f, "Forbidden: You cannot delete your own account"),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(err) => write!(f, "Conflict on {}: {}", err.field, err.message),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into JSON envelope responses.
///
/// Internal and database errors are logged with their detail and answered
/// with a generic message so nothing about the store leaks to clients.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::SelfDeletion => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                ApiResponse::failure("Validation failed").with_errors(errors.clone())
            }
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => ApiResponse::failure(msg),
            AppError::Conflict(err) => {
                ApiResponse::failure(err.message.clone()).with_errors(vec![err.clone()])
            }
            AppError::SelfDeletion => ApiResponse::failure("You cannot delete your own account"),
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                log::error!("{}", msg);
                ApiResponse::failure("Internal server error")
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound` and unique-constraint violations
/// (SQLSTATE 23505) become `Conflict` on the column named by the constraint.
/// Values too long for their column (22001) are a `BadRequest`; everything
/// else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("23505") => {
                AppError::conflict(
                    conflict_field(db_err.constraint()),
                    "Duplicate entry. This record already exists.",
                )
            }
            sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("22001") => {
                AppError::BadRequest("Value too long for field".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Maps a unique constraint such as `users_email_key` to its column.
fn conflict_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(name) if name.contains("email") => "email",
        Some(name) if name.contains("username") => "username",
        _ => "id",
    }
}

/// Flattens `validator::ValidationErrors` into field-level errors, sorted by
/// field name so responses are stable.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldError {
                    field: field.to_string(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationError(fields)
    }
}

/// Any JWT failure is an authentication failure; the detail is only logged.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("token rejected: {}", error);
        AppError::Unauthorized("Invalid or expired token".into())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Password hashing failed: {}", error))
    }
}
