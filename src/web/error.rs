use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::error::ServiceError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Inactive account")]
    InactiveAccount,
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Password hashing failed: {0}")]
    PasswordHashingError(String),
    #[error("JWT creation failed: {0}")]
    TokenCreationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Incorrect email or password".to_string()),
            AppError::InactiveAccount => (StatusCode::BAD_REQUEST, "Inactive user".to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::PasswordHashingError(msg) => {
                error!(error = %msg, "Password hashing failed.");
                (StatusCode::INTERNAL_SERVER_ERROR, "Password hashing error".to_string())
            }
            AppError::TokenCreationError(msg) => {
                error!(error = %msg, "Token creation failed.");
                (StatusCode::INTERNAL_SERVER_ERROR, "Token creation error".to_string())
            }
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database operation failed.");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": error_message }))).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => AppError::NotFound(err.to_string()),
            ServiceError::DuplicateEmail(_) | ServiceError::DuplicateTag(_) => AppError::Conflict(err.to_string()),
            ServiceError::InvalidCredentials => AppError::InvalidCredentials,
            ServiceError::InactiveAccount => AppError::InactiveAccount,
            ServiceError::Validation(msg) => AppError::InvalidInput(msg),
            ServiceError::PasswordHashing(msg) => AppError::PasswordHashingError(msg),
            ServiceError::TokenCreation(msg) => AppError::TokenCreationError(msg),
            ServiceError::Database(db_err) => AppError::DatabaseError(db_err.to_string()),
        }
    }
}

// Extractor rejections carry axum's plain-text explanation; re-wrap it so
// every failure keeps the `{"error": ...}` body.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
