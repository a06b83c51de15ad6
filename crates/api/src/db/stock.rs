//! Stock ledger repository.
//!
//! Units move between a product's reserve (`product.quantity`) and its
//! ledger entry (`stock.quantity`); every move happens in one transaction
//! with a guarded decrement so neither side can go negative.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use stockroom_core::{EmployeeId, LOW_STOCK_THRESHOLD, ProductId, StockId, StockReferenceId};

use super::RepositoryError;
use crate::models::{Stock, StockLine};

#[derive(Debug, sqlx::FromRow)]
pub(super) struct StockRow {
    pub(super) id: Uuid,
    pub(super) product_id: Uuid,
    pub(super) stock_reference_id: Uuid,
    pub(super) quantity: i32,
    pub(super) available: bool,
    pub(super) responsible_employee_id: Option<Uuid>,
    pub(super) date_added: DateTime<Utc>,
}

impl From<StockRow> for Stock {
    fn from(row: StockRow) -> Self {
        Self {
            id: StockId::new(row.id),
            product_id: ProductId::new(row.product_id),
            stock_reference_id: StockReferenceId::new(row.stock_reference_id),
            quantity: row.quantity,
            available: row.available,
            responsible_employee_id: row.responsible_employee_id.map(EmployeeId::new),
            date_added: row.date_added,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StockLineRow {
    product_id: Uuid,
    product_name: String,
    price: Decimal,
    quantity: i32,
    available: bool,
    responsible_name: Option<String>,
}

impl From<StockLineRow> for StockLine {
    fn from(row: StockLineRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            price: row.price,
            quantity: row.quantity,
            is_available: row.available,
            responsible_user: row.responsible_name,
        }
    }
}

/// Outcome of a top-up.
#[derive(Debug, Clone)]
pub struct TopUp {
    pub stock: Stock,
    /// Low-stock notifications marked read by this top-up.
    pub notifications_cleared: u64,
}

/// Repository for stock ledger database operations.
pub struct StockRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StockRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a reference's ledger ordered by product name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(
        &self,
        stock_reference_id: StockReferenceId,
    ) -> Result<Vec<StockLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, StockLineRow>(
            r"
            SELECT s.product_id, p.name AS product_name, p.price, s.quantity, s.available,
                   e.name AS responsible_name
            FROM stock s
            JOIN product p ON p.id = s.product_id
            LEFT JOIN employee e ON e.id = s.responsible_employee_id
            WHERE s.stock_reference_id = $1
            ORDER BY p.name
            ",
        )
        .bind(stock_reference_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product's ledger entry in a reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        stock_reference_id: StockReferenceId,
        product_id: ProductId,
    ) -> Result<Option<Stock>, RepositoryError> {
        let row = sqlx::query_as::<_, StockRow>(
            r"
            SELECT id, product_id, stock_reference_id, quantity, available,
                   responsible_employee_id, date_added
            FROM stock
            WHERE stock_reference_id = $1 AND product_id = $2
            ",
        )
        .bind(stock_reference_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Move `quantity` units from the product reserve onto a new ledger entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already on the
    /// ledger or its reserve is smaller than `quantity`.
    pub async fn place(
        &self,
        stock_reference_id: StockReferenceId,
        product_id: ProductId,
        quantity: i32,
        available: bool,
        responsible: EmployeeId,
    ) -> Result<Stock, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        take_from_reserve(&mut tx, product_id, quantity).await?;

        let row = sqlx::query_as::<_, StockRow>(
            r"
            INSERT INTO stock (product_id, stock_reference_id, quantity, available,
                               responsible_employee_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, stock_reference_id, quantity, available,
                      responsible_employee_id, date_added
            ",
        )
        .bind(product_id)
        .bind(stock_reference_id)
        .bind(quantity)
        .bind(available)
        .bind(responsible)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product is already on the stock ledger"))?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Move `quantity` more units from the reserve onto an existing entry.
    ///
    /// When the entry ends above the low-stock threshold, that product's
    /// unread notifications in the reference are marked read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not on the ledger.
    /// Returns `RepositoryError::Conflict` if the reserve is smaller than
    /// `quantity` or the entry would exceed the integer range.
    pub async fn top_up(
        &self,
        stock_reference_id: StockReferenceId,
        product_id: ProductId,
        quantity: i32,
        available: Option<bool>,
    ) -> Result<TopUp, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        take_from_reserve(&mut tx, product_id, quantity).await?;

        let row = sqlx::query_as::<_, StockRow>(
            r"
            UPDATE stock
            SET quantity = quantity + $3,
                available = COALESCE($4, available)
            WHERE stock_reference_id = $1 AND product_id = $2
            RETURNING id, product_id, stock_reference_id, quantity, available,
                      responsible_employee_id, date_added
            ",
        )
        .bind(stock_reference_id)
        .bind(product_id)
        .bind(quantity)
        .bind(available)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_out_of_range(e, "stock quantity out of range"))?
        .ok_or(RepositoryError::NotFound)?;

        let notifications_cleared = if row.quantity > LOW_STOCK_THRESHOLD {
            sqlx::query(
                r"
                UPDATE notification
                SET is_read = TRUE
                WHERE stock_reference_id = $1 AND product_id = $2 AND NOT is_read
                ",
            )
            .bind(stock_reference_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
        } else {
            0
        };

        tx.commit().await?;
        Ok(TopUp {
            stock: row.into(),
            notifications_cleared,
        })
    }

    /// Remove a ledger entry, returning its units to the product reserve.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not on the ledger.
    pub async fn remove(
        &self,
        stock_reference_id: StockReferenceId,
        product_id: ProductId,
    ) -> Result<i32, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let returned: i32 = sqlx::query_scalar(
            r"
            DELETE FROM stock
            WHERE stock_reference_id = $1 AND product_id = $2
            RETURNING quantity
            ",
        )
        .bind(stock_reference_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        sqlx::query(
            "UPDATE product SET quantity = quantity + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(product_id)
        .bind(returned)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_out_of_range(e, "product reserve out of range"))?;

        tx.commit().await?;
        Ok(returned)
    }
}

async fn take_from_reserve(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    quantity: i32,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE product
        SET quantity = quantity - $2, updated_at = NOW()
        WHERE id = $1 AND quantity >= $2
        ",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::Conflict(
            "quantity exceeds the product reserve".to_string(),
        ));
    }
    Ok(())
}
