//! Stock manager handlers: the active reference's ledger.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use tracing::instrument;

use stockroom_core::{ProductId, StockReferenceId};

use crate::db::{ProductRepository, RepositoryError, StockReferenceRepository, StockRepository};
use crate::error::AppError;
use crate::middleware::RequireEmployee;
use crate::models::{Stock, StockLine};
use crate::state::AppState;

/// Build the stock router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stock", get(list).post(place))
        .route("/stock/{product_id}", put(top_up).delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct PlaceStockRequest {
    pub product_id: ProductId,
    pub quantity: i32,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

const fn default_available() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    pub quantity: i32,
    pub is_available: Option<bool>,
}

async fn active_reference(state: &AppState) -> Result<StockReferenceId, AppError> {
    StockReferenceRepository::new(state.pool())
        .get_active()
        .await?
        .map(|r| r.id)
        .ok_or_else(|| AppError::BadRequest("no active stock reference".to_string()))
}

/// Reserve shortfalls are client errors here, not conflicts.
fn reserve_error(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
        RepositoryError::NotFound => AppError::NotFound("product is not in stock".to_string()),
        other => other.into(),
    }
}

/// Ledger of the active reference, by product name.
#[instrument(skip_all)]
pub async fn list(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Vec<StockLine>>, AppError> {
    let Some(reference) = StockReferenceRepository::new(state.pool()).get_active().await? else {
        return Ok(Json(Vec::new()));
    };
    let lines = StockRepository::new(state.pool())
        .list_lines(reference.id)
        .await?;
    Ok(Json(lines))
}

/// Move units from a product's reserve onto the active ledger.
#[instrument(skip_all)]
pub async fn place(
    RequireEmployee(me): RequireEmployee,
    State(state): State<AppState>,
    Json(body): Json<PlaceStockRequest>,
) -> Result<(StatusCode, Json<Stock>), AppError> {
    if body.quantity < 0 {
        return Err(AppError::BadRequest("quantity cannot be negative".to_string()));
    }
    let reference = active_reference(&state).await?;

    ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;

    let stock = StockRepository::new(state.pool());
    if stock.get(reference, body.product_id).await?.is_some() {
        return Err(AppError::BadRequest(
            "product is already in the active stock".to_string(),
        ));
    }

    let entry = stock
        .place(reference, body.product_id, body.quantity, body.is_available, me.id)
        .await
        .map_err(reserve_error)?;

    tracing::info!(
        product_id = %body.product_id,
        quantity = body.quantity,
        responsible = %me.id,
        "Stock placed"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Move more units from the reserve onto an existing ledger entry.
#[instrument(skip_all)]
pub async fn top_up(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(body): Json<TopUpRequest>,
) -> Result<Json<Stock>, AppError> {
    if body.quantity < 0 {
        return Err(AppError::BadRequest("quantity cannot be negative".to_string()));
    }
    let reference = active_reference(&state).await?;

    let result = StockRepository::new(state.pool())
        .top_up(reference, product_id, body.quantity, body.is_available)
        .await
        .map_err(reserve_error)?;

    tracing::info!(
        product_id = %product_id,
        added = body.quantity,
        quantity = result.stock.quantity,
        notifications_cleared = result.notifications_cleared,
        "Stock topped up"
    );
    Ok(Json(result.stock))
}

/// Take a product off the ledger, returning its units to the reserve.
#[instrument(skip_all)]
pub async fn remove(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode, AppError> {
    let reference = active_reference(&state).await?;
    let returned = StockRepository::new(state.pool())
        .remove(reference, product_id)
        .await
        .map_err(reserve_error)?;

    tracing::info!(product_id = %product_id, returned, "Stock removed");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_reserve_errors_are_client_errors() {
        let err = reserve_error(RepositoryError::Conflict("over reserve".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = reserve_error(RepositoryError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
