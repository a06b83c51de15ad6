//! Per-employee shopping cart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use stockroom_core::{CartId, CartItemId, EmployeeId, ProductId};

/// An employee's cart with its items.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub employee_id: EmployeeId,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartItem>,
}

/// A product line in a cart, joined with the product's name and price.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: ProductId,
    pub product_name: String,
    pub product_price: Decimal,
    pub quantity: i32,
}
