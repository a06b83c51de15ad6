//! Action history handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use tracing::instrument;

use stockroom_core::EmployeeId;

use crate::db::{AuditRepository, EmployeeRepository};
use crate::error::AppError;
use crate::middleware::RequireEmployee;
use crate::models::ActionHistory;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/action-history", get(list))
        .route("/employees/{id}/action-history", get(for_employee))
}

#[instrument(skip_all)]
pub async fn list(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Vec<ActionHistory>>, AppError> {
    let actions = AuditRepository::new(state.pool()).list_all().await?;
    Ok(Json(actions))
}

#[instrument(skip_all)]
pub async fn for_employee(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> Result<Json<Vec<ActionHistory>>, AppError> {
    EmployeeRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("employee".to_string()))?;

    let actions = AuditRepository::new(state.pool())
        .list_for_employee(id)
        .await?;
    Ok(Json(actions))
}
