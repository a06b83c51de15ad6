//! Stock reference ("sector") handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use stockroom_core::StockReferenceId;

use crate::db::StockReferenceRepository;
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireEmployee};
use crate::models::StockReference;
use crate::state::AppState;

/// Build the stock references router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stock-references", get(list).post(create))
        .route(
            "/stock-references/{id}",
            get(show).put(update).delete(destroy),
        )
        .route("/stock-references/{id}/activate", post(activate))
        .route("/stock-references/{id}/deactivate", post(deactivate))
}

#[derive(Debug, Deserialize)]
pub struct CreateReferenceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReferenceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

fn required_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    Ok(name)
}

#[instrument(skip_all)]
pub async fn list(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Vec<StockReference>>, AppError> {
    let references = StockReferenceRepository::new(state.pool()).list_all().await?;
    Ok(Json(references))
}

#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateReferenceRequest>,
) -> Result<(StatusCode, Json<StockReference>), AppError> {
    let name = required_name(&body.name)?;
    let reference = StockReferenceRepository::new(state.pool())
        .create(name, body.description.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(reference)))
}

#[instrument(skip_all)]
pub async fn show(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Path(id): Path<StockReferenceId>,
) -> Result<Json<StockReference>, AppError> {
    let reference = StockReferenceRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("stock reference".to_string()))?;
    Ok(Json(reference))
}

#[instrument(skip_all)]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<StockReferenceId>,
    Json(body): Json<UpdateReferenceRequest>,
) -> Result<Json<StockReference>, AppError> {
    let name = body.name.as_deref().map(required_name).transpose()?;
    let reference = StockReferenceRepository::new(state.pool())
        .update(id, name, body.description.as_deref().map(str::trim))
        .await?;
    Ok(Json(reference))
}

#[instrument(skip_all)]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<StockReferenceId>,
) -> Result<StatusCode, AppError> {
    StockReferenceRepository::new(state.pool()).delete(id).await?;
    tracing::info!(reference_id = %id, deleted_by = %admin.id, "Stock reference deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Make this the only active reference.
#[instrument(skip_all)]
pub async fn activate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<StockReferenceId>,
) -> Result<Json<StockReference>, AppError> {
    let reference = StockReferenceRepository::new(state.pool())
        .activate(id)
        .await?;
    tracing::info!(
        reference_id = %id,
        name = %reference.name,
        activated_by = %admin.id,
        "Stock reference activated"
    );
    Ok(Json(reference))
}

#[instrument(skip_all)]
pub async fn deactivate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<StockReferenceId>,
) -> Result<Json<StockReference>, AppError> {
    let reference = StockReferenceRepository::new(state.pool())
        .deactivate(id)
        .await?;
    tracing::info!(reference_id = %id, deactivated_by = %admin.id, "Stock reference deactivated");
    Ok(Json(reference))
}
