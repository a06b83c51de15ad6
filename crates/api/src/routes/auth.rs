//! Token issuance and login activity.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use stockroom_core::{EmployeeId, EmployeeRole};

use crate::db::EmployeeRepository;
use crate::error::AppError;
use crate::middleware::{ClientIp, RequireAdmin, auth_rate_limiter};
use crate::models::{CurrentEmployee, LoginActivity};
use crate::services::auth::{AuthError, AuthService, TokenType};
use crate::state::AppState;

const DEFAULT_ACTIVITY_LIMIT: i64 = 100;

/// Build the auth router. The token endpoints are rate limited per IP.
pub fn router(trust_proxy: bool) -> Router<AppState> {
    let tokens = Router::new()
        .route("/token", post(obtain_token))
        .route("/token/refresh", post(refresh_token))
        .layer(auth_rate_limiter(trust_proxy));

    Router::new()
        .merge(tokens)
        .route("/login-activity", get(login_activity))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenEmployee {
    pub id: EmployeeId,
    pub role: EmployeeRole,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub employee: TokenEmployee,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

/// Exchange a username and password for an access/refresh pair.
#[instrument(skip_all)]
pub async fn obtain_token(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let ip = ip.map(|ip| ip.to_string());
    let employee = AuthService::new(state.pool())
        .login(&body.username, &body.password, ip.as_deref())
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::warn!(username = %body.username, ip = ?ip, "Login failed");
            }
        })?;

    let current = CurrentEmployee::from(&employee);
    let pair = state
        .jwt()
        .issue_pair(&current)
        .map_err(AuthError::from)?;

    tracing::info!(employee_id = %employee.id, "Login succeeded");

    Ok(Json(TokenResponse {
        access: pair.access,
        refresh: pair.refresh,
        employee: TokenEmployee {
            id: employee.id,
            role: employee.role,
        },
    }))
}

/// Exchange a refresh token for a new access token.
///
/// The employee is reloaded so role changes and deactivation apply.
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let claims = state
        .jwt()
        .validate(&body.refresh, TokenType::Refresh)
        .map_err(AuthError::from)?;

    let employee = EmployeeRepository::new(state.pool())
        .get_by_id(claims.sub)
        .await?
        .filter(|e| e.is_active)
        .ok_or(AuthError::InvalidCredentials)?;

    let access = state
        .jwt()
        .issue(&CurrentEmployee::from(&employee), TokenType::Access)
        .map_err(AuthError::from)?;

    Ok(Json(RefreshResponse { access }))
}

/// Most recent login attempts first.
#[instrument(skip_all)]
pub async fn login_activity(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<LoginActivity>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, 1000);
    let activity = EmployeeRepository::new(state.pool())
        .list_login_activity(limit)
        .await?;
    Ok(Json(activity))
}
