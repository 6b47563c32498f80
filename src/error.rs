use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Failures of the domain services. Every variant is terminal for the
/// operation that produced it.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The entity is absent or owned by someone else.
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),
    #[error("A tag named '{0}' already exists")]
    DuplicateTag(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Inactive account")]
    InactiveAccount,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),
    #[error("Token creation failed: {0}")]
    TokenCreation(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
