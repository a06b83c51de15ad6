//! Product catalog handlers. Products live under the active stock reference.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use stockroom_core::ProductId;

use crate::db::{NewProduct, ProductRepository, ProductUpdate, StockReferenceRepository};
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireEmployee};
use crate::models::Product;
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/{id}", get(show).put(update).delete(destroy))
}

/// Catalog view of a product.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub acquisition_value: Decimal,
    pub price: Decimal,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            quantity: product.quantity,
            acquisition_value: product.acquisition_value,
            price: product.price,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: i32,
    pub acquisition_value: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    /// Added to the current reserve.
    pub quantity: Option<i32>,
    pub acquisition_value: Option<Decimal>,
}

fn non_negative(field: &str, value: Decimal) -> Result<Decimal, AppError> {
    if value < Decimal::ZERO {
        return Err(AppError::BadRequest(format!("{field} cannot be negative")));
    }
    Ok(value)
}

/// Products of the active reference, by name. Empty when none is active.
#[instrument(skip_all)]
pub async fn list(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductView>>, AppError> {
    let Some(reference) = StockReferenceRepository::new(state.pool()).get_active().await? else {
        return Ok(Json(Vec::new()));
    };
    let products = ProductRepository::new(state.pool())
        .list_by_reference(reference.id)
        .await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

#[instrument(skip_all)]
pub async fn create(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductView>), AppError> {
    let reference = StockReferenceRepository::new(state.pool())
        .get_active()
        .await?
        .ok_or_else(|| AppError::BadRequest("no active stock reference".to_string()))?;

    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    let acquisition_value = body
        .acquisition_value
        .ok_or_else(|| AppError::BadRequest("acquisition_value is required".to_string()))?;
    if body.quantity < 0 {
        return Err(AppError::BadRequest("quantity cannot be negative".to_string()));
    }

    let new = NewProduct {
        name: name.to_string(),
        description: body.description.trim().to_string(),
        price: non_negative("price", body.price)?,
        quantity: body.quantity,
        acquisition_value: non_negative("acquisition_value", acquisition_value)?,
    };

    let product = ProductRepository::new(state.pool())
        .create(reference.id, &new)
        .await?;
    tracing::info!(product_id = %product.id, reference_id = %reference.id, "Product created");
    Ok((StatusCode::CREATED, Json(product.into())))
}

#[instrument(skip_all)]
pub async fn show(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>, AppError> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;
    Ok(Json(product.into()))
}

/// Partial update. `quantity` is a delta on the reserve.
#[instrument(skip_all)]
pub async fn update(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ProductView>, AppError> {
    let name = body.name.map(|n| n.trim().to_string());
    if name.as_deref().is_some_and(str::is_empty) {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let update = ProductUpdate {
        name,
        description: body.description,
        price: body.price.map(|p| non_negative("price", p)).transpose()?,
        quantity: body.quantity,
        acquisition_value: body
            .acquisition_value
            .map(|v| non_negative("acquisition_value", v))
            .transpose()?,
    };

    let product = ProductRepository::new(state.pool())
        .update(id, &update)
        .await?;
    Ok(Json(product.into()))
}

#[instrument(skip_all)]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, AppError> {
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(product_id = %id, deleted_by = %admin.id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative() {
        assert!(non_negative("price", Decimal::ZERO).is_ok());
        assert!(non_negative("price", Decimal::new(199, 2)).is_ok());
        assert!(matches!(
            non_negative("price", Decimal::new(-1, 2)),
            Err(AppError::BadRequest(msg)) if msg == "price cannot be negative"
        ));
    }
}
