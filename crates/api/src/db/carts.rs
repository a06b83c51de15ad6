//! Cart repository. Every employee owns exactly one cart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use stockroom_core::{CartId, CartItemId, EmployeeId, ProductId};

use super::RepositoryError;
use crate::models::{Cart, CartItem};

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    employee_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    product_id: Uuid,
    product_name: String,
    product_price: Decimal,
    quantity: i32,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            product: ProductId::new(row.product_id),
            product_name: row.product_name,
            product_price: row.product_price,
            quantity: row.quantity,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an employee's cart with its items, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, employee_id: EmployeeId) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO cart (employee_id)
            VALUES ($1)
            ON CONFLICT (employee_id) DO UPDATE SET employee_id = EXCLUDED.employee_id
            RETURNING id, employee_id, created_at
            ",
        )
        .bind(employee_id)
        .fetch_one(self.pool)
        .await?;

        self.with_items(row).await
    }

    /// Get an employee's cart without creating one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, employee_id, created_at FROM cart WHERE employee_id = $1",
        )
        .bind(employee_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.with_items(row).await?)),
            None => Ok(None),
        }
    }

    /// Quantity of a product already in an employee's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn quantity_in_cart(
        &self,
        employee_id: EmployeeId,
        product_id: ProductId,
    ) -> Result<i32, RepositoryError> {
        let quantity: Option<i32> = sqlx::query_scalar(
            r"
            SELECT ci.quantity
            FROM cart_item ci
            JOIN cart c ON c.id = ci.cart_id
            WHERE c.employee_id = $1 AND ci.product_id = $2
            ",
        )
        .bind(employee_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(quantity.unwrap_or(0))
    }

    /// Add `quantity` of a product to an employee's cart, merging with an
    /// existing line for the same product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the merged quantity is out of range.
    /// Returns `RepositoryError::Database` if another statement fails.
    pub async fn add_item(
        &self,
        employee_id: EmployeeId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_id: Uuid = sqlx::query_scalar(
            r"
            INSERT INTO cart (employee_id)
            VALUES ($1)
            ON CONFLICT (employee_id) DO UPDATE SET employee_id = EXCLUDED.employee_id
            RETURNING id
            ",
        )
        .bind(employee_id)
        .fetch_one(&mut *tx)
        .await?;

        let item_id: Uuid = sqlx::query_scalar(
            r"
            INSERT INTO cart_item (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = cart_item.quantity + EXCLUDED.quantity
            RETURNING id
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_out_of_range(e, "cart quantity out of range"))?;

        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT ci.id, ci.product_id, p.name AS product_name, p.price AS product_price,
                   ci.quantity
            FROM cart_item ci
            JOIN product p ON p.id = ci.product_id
            WHERE ci.id = $1
            ",
        )
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Remove an item from the employee's own cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item is not in that cart.
    pub async fn remove_item(
        &self,
        employee_id: EmployeeId,
        item_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM cart_item
            WHERE id = $1
              AND cart_id IN (SELECT id FROM cart WHERE employee_id = $2)
            ",
        )
        .bind(item_id)
        .bind(employee_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn with_items(&self, row: CartRow) -> Result<Cart, RepositoryError> {
        let items = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT ci.id, ci.product_id, p.name AS product_name, p.price AS product_price,
                   ci.quantity
            FROM cart_item ci
            JOIN product p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY p.name
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        Ok(Cart {
            id: CartId::new(row.id),
            employee_id: EmployeeId::new(row.employee_id),
            created_at: row.created_at,
            items: items.into_iter().map(Into::into).collect(),
        })
    }
}
