//! Cart handlers. Every employee has at most one cart.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::Deserialize;
use tracing::instrument;

use stockroom_core::{CartItemId, EmployeeId, ProductId};

use crate::db::{CartRepository, EmployeeRepository};
use crate::error::AppError;
use crate::middleware::RequireEmployee;
use crate::models::{Cart, CartItem};
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(show))
        .route("/cart/add", post(add))
        .route("/cart/items/{item_id}", delete(remove_item))
        .route("/cart/employees/{employee_id}/items", get(employee_items))
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// The caller's cart, created on first access.
#[instrument(skip_all)]
pub async fn show(
    RequireEmployee(me): RequireEmployee,
    State(state): State<AppState>,
) -> Result<Json<Cart>, AppError> {
    let cart = CartRepository::new(state.pool()).get_or_create(me.id).await?;
    Ok(Json(cart))
}

#[instrument(skip_all)]
pub async fn add(
    RequireEmployee(me): RequireEmployee,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartItem>), AppError> {
    let item = CheckoutService::new(state.pool())
        .add_to_cart(me.id, body.product_id, body.quantity)
        .await?;

    tracing::debug!(
        employee_id = %me.id,
        product_id = %body.product_id,
        quantity = item.quantity,
        "Cart item added"
    );
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip_all)]
pub async fn remove_item(
    RequireEmployee(me): RequireEmployee,
    State(state): State<AppState>,
    Path(item_id): Path<CartItemId>,
) -> Result<StatusCode, AppError> {
    CartRepository::new(state.pool())
        .remove_item(me.id, item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Items in another employee's cart.
#[instrument(skip_all)]
pub async fn employee_items(
    RequireEmployee(_me): RequireEmployee,
    State(state): State<AppState>,
    Path(employee_id): Path<EmployeeId>,
) -> Result<Json<Vec<CartItem>>, AppError> {
    EmployeeRepository::new(state.pool())
        .get_by_id(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("employee".to_string()))?;

    let cart = CartRepository::new(state.pool())
        .get_by_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("cart".to_string()))?;
    Ok(Json(cart.items))
}
