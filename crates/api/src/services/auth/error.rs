//! Authentication error types.

use thiserror::Error;

use stockroom_core::{ContactError, EmailError};

use super::jwt::TokenError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication and employee registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid contact number.
    #[error("invalid contact: {0}")]
    InvalidContact(#[from] ContactError),

    /// Required field missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Wrong username or password, or the employee is inactive.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username or email already registered.
    #[error("employee already exists")]
    EmployeeAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Access or refresh token rejected.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
