//! Product repository: the catalog and each product's acquisition history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use stockroom_core::{ProductHistoryId, ProductId, StockReferenceId};

use super::RepositoryError;
use crate::models::{Product, ProductHistory};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    stock_reference_id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    quantity: i32,
    acquisition_value: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            stock_reference_id: StockReferenceId::new(row.stock_reference_id),
            name: row.name,
            description: row.description,
            price: row.price,
            quantity: row.quantity,
            acquisition_value: row.acquisition_value,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductHistoryRow {
    id: Uuid,
    product_id: Uuid,
    stock_reference_id: Uuid,
    acquisition_value: Decimal,
    product_quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductHistoryRow> for ProductHistory {
    fn from(row: ProductHistoryRow) -> Self {
        Self {
            id: ProductHistoryId::new(row.id),
            product_id: ProductId::new(row.product_id),
            stock_reference_id: StockReferenceId::new(row.stock_reference_id),
            acquisition_value: row.acquisition_value,
            product_quantity: row.product_quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Validated input for a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub acquisition_value: Decimal,
}

/// Partial update of a product.
///
/// `quantity` is a delta added to the reserve, not a replacement.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub acquisition_value: Option<Decimal>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the products of a stock reference ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_reference(
        &self,
        stock_reference_id: StockReferenceId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, stock_reference_id, name, description, price, quantity,
                   acquisition_value, created_at, updated_at
            FROM product
            WHERE stock_reference_id = $1
            ORDER BY name
            ",
        )
        .bind(stock_reference_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, stock_reference_id, name, description, price, quantity,
                   acquisition_value, created_at, updated_at
            FROM product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get the acquisition history row of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_history(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductHistory>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductHistoryRow>(
            r"
            SELECT id, product_id, stock_reference_id, acquisition_value, product_quantity,
                   created_at, updated_at
            FROM product_history
            WHERE product_id = $1
            ",
        )
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a product under a stock reference along with its history row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the reference already has a
    /// product with that name.
    pub async fn create(
        &self,
        stock_reference_id: StockReferenceId,
        new: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO product (stock_reference_id, name, description, price, quantity,
                                 acquisition_value)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, stock_reference_id, name, description, price, quantity,
                      acquisition_value, created_at, updated_at
            ",
        )
        .bind(stock_reference_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.quantity)
        .bind(new.acquisition_value)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product name already exists"))?;

        sqlx::query(
            r"
            INSERT INTO product_history (product_id, stock_reference_id, acquisition_value,
                                         product_quantity)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(row.id)
        .bind(stock_reference_id)
        .bind(new.acquisition_value)
        .bind(new.quantity)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Apply a partial update and keep the history row in step.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the reserve would go negative or
    /// out of range, or the new name is taken.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, stock_reference_id, name, description, price, quantity,
                   acquisition_value, created_at, updated_at
            FROM product
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let delta = update.quantity.unwrap_or(0);
        apply_delta(current.quantity, delta)?;

        let history_quantity: Option<i32> = sqlx::query_scalar(
            "SELECT product_quantity FROM product_history WHERE product_id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(quantity) = history_quantity {
            apply_delta(quantity, delta)?;
        }

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE product
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                quantity = quantity + $5,
                acquisition_value = COALESCE($6, acquisition_value),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, stock_reference_id, name, description, price, quantity,
                      acquisition_value, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.description.as_deref())
        .bind(update.price)
        .bind(delta)
        .bind(update.acquisition_value)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product name already exists"))?;

        sqlx::query(
            r"
            INSERT INTO product_history (product_id, stock_reference_id, acquisition_value,
                                         product_quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id) DO UPDATE
            SET acquisition_value = EXCLUDED.acquisition_value,
                product_quantity = product_history.product_quantity + $5,
                updated_at = NOW()
            ",
        )
        .bind(row.id)
        .bind(row.stock_reference_id)
        .bind(row.acquisition_value)
        .bind(row.quantity)
        .bind(delta)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Delete a product. Its ledger entry, history and cart lines go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Reserve after applying `delta`. Negative results and `i32` overflow are
/// conflicts.
fn apply_delta(current: i32, delta: i32) -> Result<i32, RepositoryError> {
    match current.checked_add(delta) {
        Some(quantity) if quantity >= 0 => Ok(quantity),
        Some(_) => Err(RepositoryError::Conflict(format!(
            "product reserve is {current} and cannot drop by {}",
            delta.unsigned_abs()
        ))),
        None => Err(RepositoryError::Conflict(format!(
            "product reserve is {current} and cannot change by {delta}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_delta_within_range() {
        assert!(matches!(apply_delta(5, 3), Ok(8)));
        assert!(matches!(apply_delta(5, -5), Ok(0)));
    }

    #[test]
    fn test_apply_delta_rejects_negative_reserve() {
        let err = apply_delta(5, -6).unwrap_err();
        assert!(
            matches!(err, RepositoryError::Conflict(ref msg) if msg.contains("cannot drop by 6"))
        );
    }

    #[test]
    fn test_apply_delta_rejects_overflow() {
        assert!(matches!(
            apply_delta(5, i32::MAX),
            Err(RepositoryError::Conflict(_))
        ));
        assert!(matches!(
            apply_delta(0, i32::MIN),
            Err(RepositoryError::Conflict(_))
        ));
    }
}
