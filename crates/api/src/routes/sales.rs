//! Sale handlers: recording, listing, aggregates and archival.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use stockroom_core::{EmployeeId, ProductId, SaleId};

use crate::db::{EmployeeRepository, SaleRepository};
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireEmployee};
use crate::models::{DailySales, EmployeeSalesReport, EmployeeSalesTotal, Sale};
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// Build the sales router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list).post(create))
        .route("/sales/aggregate-by-date", get(aggregate_by_date))
        .route("/sales/by-employee", get(by_employee))
        .route("/sales/archive", post(archive))
        .route("/employees/{id}/sales", get(employee_sales))
}

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub product: ProductId,
    pub sale_quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CreateSaleResponse {
    pub message: String,
    pub sale_id: SaleId,
}

#[derive(Debug, Serialize)]
pub struct ArchiveResponse {
    pub archived: u64,
}

/// Sell from the active ledger as the calling employee.
#[instrument(skip_all)]
pub async fn create(
    RequireEmployee(me): RequireEmployee,
    State(state): State<AppState>,
    Json(body): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<CreateSaleResponse>), AppError> {
    let recorded = CheckoutService::new(state.pool())
        .sell(me.id, body.product, body.sale_quantity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSaleResponse {
            message: "Sale recorded".to_string(),
            sale_id: recorded.sale.id,
        }),
    ))
}

#[instrument(skip_all)]
pub async fn list(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Vec<Sale>>, AppError> {
    let sales = SaleRepository::new(state.pool()).list_all().await?;
    Ok(Json(sales))
}

/// Unarchived sales of one employee, grouped by product and day.
#[instrument(skip_all)]
pub async fn employee_sales(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> Result<Json<EmployeeSalesReport>, AppError> {
    EmployeeRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("employee".to_string()))?;

    let lines = SaleRepository::new(state.pool())
        .unarchived_lines_for(id)
        .await?;
    Ok(Json(EmployeeSalesReport::from_lines(id, lines)))
}

#[instrument(skip_all)]
pub async fn aggregate_by_date(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Vec<DailySales>>, AppError> {
    let days = SaleRepository::new(state.pool()).aggregate_by_date().await?;
    Ok(Json(days))
}

#[instrument(skip_all)]
pub async fn by_employee(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeSalesTotal>>, AppError> {
    let totals = SaleRepository::new(state.pool())
        .totals_by_employee()
        .await?;
    Ok(Json(totals))
}

#[instrument(skip_all)]
pub async fn archive(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ArchiveResponse>, AppError> {
    let archived = SaleRepository::new(state.pool()).archive_all().await?;
    tracing::info!(archived, archived_by = %admin.id, "Sales archived");
    Ok(Json(ArchiveResponse { archived }))
}
