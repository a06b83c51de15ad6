//! Unified error handling for the API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use stockroom_core::EmployeeId;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::SaleError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Login, registration or token failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Sale or cart check failed.
    #[error(transparent)]
    Sale(#[from] SaleError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(e)
            | Self::Auth(AuthError::Repository(e))
            | Self::Sale(SaleError::Repository(e)) => repository_status(e),
            Self::Auth(e) => match e {
                AuthError::InvalidEmail(_)
                | AuthError::InvalidContact(_)
                | AuthError::MissingField(_)
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials | AuthError::Token(_) => StatusCode::UNAUTHORIZED,
                AuthError::EmployeeAlreadyExists => StatusCode::CONFLICT,
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Sale(e) => match e {
                SaleError::InvalidQuantity
                | SaleError::NoActiveReference
                | SaleError::Unavailable
                | SaleError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
                SaleError::ProductNotFound
                | SaleError::NotOnLedger
                | SaleError::HistoryNotFound => StatusCode::NOT_FOUND,
                SaleError::SellerNotFound => StatusCode::UNAUTHORIZED,
                SaleError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show the client.
    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            return "Internal server error".to_string();
        }
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Auth(AuthError::Token(_)) => "Invalid or expired token".to_string(),
            Self::Auth(e) => e.to_string(),
            Self::Sale(e) => e.to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
            Self::Database(e) => e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Set the Sentry user context from the authenticated employee.
pub fn set_sentry_user(employee_id: EmployeeId, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(employee_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}
