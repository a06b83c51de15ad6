//! Authentication extractors.
//!
//! Handlers take [`RequireEmployee`] or [`RequireAdmin`] to demand a valid
//! bearer access token. Rejections are JSON errors like any other.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentEmployee;
use crate::services::auth::{JwtService, TokenType};
use crate::state::AppState;

/// Extractor that requires a valid access token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireEmployee(me): RequireEmployee) -> impl IntoResponse {
///     format!("Hello, {}!", me.username)
/// }
/// ```
pub struct RequireEmployee(pub CurrentEmployee);

impl FromRequestParts<AppState> for RequireEmployee {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let token = JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let claims = state.jwt().validate(token, TokenType::Access).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            AppError::Unauthorized("invalid or expired token".to_string())
        })?;

        let employee = CurrentEmployee::from(claims);
        set_sentry_user(employee.id, &employee.username);
        Ok(Self(employee))
    }
}

/// Extractor that requires a valid access token with the admin role.
///
/// Returns 401 without a valid token and 403 for non-admin employees.
pub struct RequireAdmin(pub CurrentEmployee);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireEmployee(employee) = RequireEmployee::from_request_parts(parts, state).await?;

        if !employee.is_admin() {
            return Err(AppError::Forbidden("admin role required".to_string()));
        }
        Ok(Self(employee))
    }
}
