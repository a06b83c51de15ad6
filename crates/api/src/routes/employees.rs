//! Employee management handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use tracing::instrument;

use stockroom_core::{Email, EmployeeId, EmployeeRole, StockReferenceId};

use crate::db::{EmployeeRepository, EmployeeUpdate, StockReferenceRepository};
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireEmployee};
use crate::models::{Employee, EmployeeHistory};
use crate::services::auth::{AuthError, AuthService, Registration};
use crate::state::AppState;

use super::MessageResponse;

/// Build the employees router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list).post(create))
        .route("/employees/{id}", get(show).put(update).delete(destroy))
        .route("/employees/{id}/sector", put(assign_sector))
        .route("/employee-history", get(history))
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub contact: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub role: EmployeeRole,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub role: Option<EmployeeRole>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SectorRequest {
    pub sector: Option<StockReferenceId>,
}

#[instrument(skip_all)]
pub async fn list(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, AppError> {
    let employees = EmployeeRepository::new(state.pool()).list_all().await?;
    Ok(Json(employees))
}

#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let employee = AuthService::new(state.pool())
        .register(&Registration {
            username: &body.username,
            email: &body.email,
            password: &body.password,
            name: &body.name,
            contact: &body.contact,
            address: &body.address,
            role: body.role,
        })
        .await?;

    tracing::info!(
        employee_id = %employee.id,
        role = %employee.role,
        created_by = %admin.id,
        "Employee created"
    );
    Ok((StatusCode::CREATED, Json(employee)))
}

#[instrument(skip_all)]
pub async fn show(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> Result<Json<Employee>, AppError> {
    let employee = EmployeeRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("employee".to_string()))?;
    Ok(Json(employee))
}

#[instrument(skip_all)]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
    Json(body): Json<UpdateEmployeeRequest>,
) -> Result<Json<Employee>, AppError> {
    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(AuthError::from)?;

    let name = body.name.map(|n| n.trim().to_string());
    if name.as_deref().is_some_and(str::is_empty) {
        return Err(AuthError::MissingField("name").into());
    }

    let employee = EmployeeRepository::new(state.pool())
        .update(
            id,
            &EmployeeUpdate {
                name,
                role: body.role,
                email,
                is_active: body.is_active,
            },
        )
        .await?;
    Ok(Json(employee))
}

#[instrument(skip_all)]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> Result<StatusCode, AppError> {
    if id == admin.id {
        return Err(AppError::BadRequest(
            "cannot delete your own account".to_string(),
        ));
    }
    EmployeeRepository::new(state.pool()).delete(id).await?;
    tracing::info!(employee_id = %id, deleted_by = %admin.id, "Employee deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Assign an employee to a stock reference.
#[instrument(skip_all)]
pub async fn assign_sector(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
    Json(body): Json<SectorRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let sector = body
        .sector
        .ok_or_else(|| AppError::BadRequest("sector is required".to_string()))?;

    let reference = StockReferenceRepository::new(state.pool())
        .get_by_id(sector)
        .await?
        .ok_or_else(|| AppError::NotFound("stock reference".to_string()))?;

    EmployeeRepository::new(state.pool())
        .set_sector(id, sector)
        .await?;

    Ok(Json(MessageResponse {
        message: format!("Employee assigned to {}", reference.name),
    }))
}

/// Employee history rows, newest first.
#[instrument(skip_all)]
pub async fn history(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeHistory>>, AppError> {
    let rows = EmployeeRepository::new(state.pool()).list_history().await?;
    Ok(Json(rows))
}
