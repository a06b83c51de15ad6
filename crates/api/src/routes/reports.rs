//! Report handlers: profit summary, stock value and PDF invoices.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use stockroom_core::{EmployeeId, ProfitSummary, SaleId};

use crate::db::{ReportRepository, SaleRepository, SalesTotals, StockReferenceRepository};
use crate::error::AppError;
use crate::middleware::RequireEmployee;
use crate::services::receipt::Receipt;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/summary", get(summary))
        .route("/reports/product-value", get(product_value))
        .route("/reports/total-sales", get(total_sales))
        .route("/reports/employee", get(employee_invoice))
        .route("/reports/receipt", get(sale_receipt))
}

#[derive(Debug, Serialize)]
pub struct ProductValueResponse {
    pub total_stock_value: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TotalSalesResponse {
    pub total_sales_value: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeInvoiceQuery {
    pub id: Option<EmployeeId>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptQuery {
    pub sale_id: Option<SaleId>,
}

/// Profit and margin of the active reference. Zeros when none is active.
#[instrument(skip_all)]
pub async fn summary(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<ProfitSummary>, AppError> {
    let totals = match StockReferenceRepository::new(state.pool()).get_active().await? {
        Some(reference) => {
            ReportRepository::new(state.pool())
                .sales_totals(reference.id)
                .await?
        }
        None => SalesTotals::default(),
    };
    Ok(Json(ProfitSummary::from_totals(
        totals.sales,
        totals.acquisition,
    )))
}

/// Acquisition value of the active reference's recorded product quantities.
#[instrument(skip_all)]
pub async fn product_value(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<ProductValueResponse>, AppError> {
    let total_stock_value = match StockReferenceRepository::new(state.pool()).get_active().await? {
        Some(reference) => {
            ReportRepository::new(state.pool())
                .product_value(reference.id)
                .await?
        }
        None => Decimal::ZERO,
    };
    Ok(Json(ProductValueResponse { total_stock_value }))
}

#[instrument(skip_all)]
pub async fn total_sales(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<TotalSalesResponse>, AppError> {
    let total_sales_value = ReportRepository::new(state.pool())
        .total_sales_value()
        .await?;
    Ok(Json(TotalSalesResponse { total_sales_value }))
}

/// PDF invoice of an employee's sales on one day.
#[instrument(skip_all)]
pub async fn employee_invoice(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Query(query): Query<EmployeeInvoiceQuery>,
) -> Result<Response, AppError> {
    let id = query
        .id
        .ok_or_else(|| AppError::BadRequest("id is required".to_string()))?;
    let date = query
        .date
        .ok_or_else(|| AppError::BadRequest("date is required".to_string()))?;

    let snapshots = SaleRepository::new(state.pool())
        .snapshots_for_employee_on(id, date)
        .await?;

    let Some(receipt) = Receipt::from_snapshots(id.to_string(), today(), &snapshots) else {
        return Ok(not_found("No sales found for this employee on that date"));
    };

    tracing::info!(employee_id = %id, %date, lines = receipt.lines.len(), "Employee invoice rendered");
    Ok(pdf_response(&receipt, &state))
}

/// PDF receipt of a single sale.
#[instrument(skip_all)]
pub async fn sale_receipt(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Query(query): Query<ReceiptQuery>,
) -> Result<Response, AppError> {
    let sale_id = query
        .sale_id
        .ok_or_else(|| AppError::BadRequest("sale_id is required".to_string()))?;

    let snapshots = SaleRepository::new(state.pool())
        .snapshots_for_sale(sale_id)
        .await?;

    let Some(receipt) = Receipt::from_snapshots(sale_id.to_string(), today(), &snapshots) else {
        return Ok(not_found("Sale not found"));
    };

    tracing::info!(sale_id = %sale_id, "Sale receipt rendered");
    Ok(pdf_response(&receipt, &state))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn not_found(message: &'static str) -> Response {
    (StatusCode::NOT_FOUND, message).into_response()
}

fn pdf_response(receipt: &Receipt, state: &AppState) -> Response {
    let body = receipt.render(&state.config().company);
    let disposition = HeaderValue::from_str(&receipt.content_disposition())
        .unwrap_or_else(|_| HeaderValue::from_static("inline"));

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
            (HeaderName::from_static("x-status"), HeaderValue::from_static("true")),
        ],
        body,
    )
        .into_response()
}
