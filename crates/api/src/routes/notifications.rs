//! Low-stock notification handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use tracing::instrument;

use stockroom_core::NotificationId;

use crate::db::{NotificationRepository, StockReferenceRepository};
use crate::error::AppError;
use crate::middleware::RequireEmployee;
use crate::models::Notification;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list))
        .route("/notifications/{id}/read", patch(mark_read))
}

/// Unread notifications of the active reference.
#[instrument(skip_all)]
pub async fn list(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let Some(reference) = StockReferenceRepository::new(state.pool()).get_active().await? else {
        return Ok(Json(Vec::new()));
    };
    let notifications = NotificationRepository::new(state.pool())
        .list_unread(reference.id)
        .await?;
    Ok(Json(notifications))
}

#[instrument(skip_all)]
pub async fn mark_read(
    RequireEmployee(me): RequireEmployee,
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
) -> Result<Json<Notification>, AppError> {
    let notification = NotificationRepository::new(state.pool())
        .mark_read(id, me.id)
        .await?;
    Ok(Json(notification))
}
