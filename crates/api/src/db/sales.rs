//! Sale repository: the sale transaction, its snapshots and sale aggregates.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use stockroom_core::{
    EmployeeId, EmployeeRole, LOW_STOCK_THRESHOLD, ProductId, SaleId, StockId, StockReferenceId,
    line_total,
};

use super::RepositoryError;
use crate::models::notification::low_stock_message;
use crate::models::{
    DailySales, Employee, EmployeeSaleLine, EmployeeSalesTotal, Product, Sale, SaleSnapshot,
};

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: Uuid,
    product_id: Uuid,
    employee_id: Uuid,
    stock_reference_id: Uuid,
    sale_quantity: i32,
    sale_date: NaiveDate,
    is_archived: bool,
    archived_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Self {
            id: SaleId::new(row.id),
            product_id: ProductId::new(row.product_id),
            employee_id: EmployeeId::new(row.employee_id),
            stock_reference_id: StockReferenceId::new(row.stock_reference_id),
            sale_quantity: row.sale_quantity,
            sale_date: row.sale_date,
            is_archived: row.is_archived,
            archived_at: row.archived_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleSnapshotRow {
    id: i64,
    sale_id: Uuid,
    product_id: Uuid,
    product_name: String,
    product_price: Decimal,
    product_acquisition_value: Decimal,
    sale_quantity: i32,
    sale_total_value: Decimal,
    employee_id: Uuid,
    employee_name: String,
    employee_email: String,
    employee_address: String,
    stock_reference_id: Uuid,
    sale_date: NaiveDate,
}

impl From<SaleSnapshotRow> for SaleSnapshot {
    fn from(row: SaleSnapshotRow) -> Self {
        Self {
            id: row.id,
            sale_id: SaleId::new(row.sale_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            product_price: row.product_price,
            product_acquisition_value: row.product_acquisition_value,
            sale_quantity: row.sale_quantity,
            sale_total_value: row.sale_total_value,
            employee_id: EmployeeId::new(row.employee_id),
            employee_name: row.employee_name,
            employee_email: row.employee_email,
            employee_address: row.employee_address,
            stock_reference_id: StockReferenceId::new(row.stock_reference_id),
            sale_date: row.sale_date,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DailySalesRow {
    date: NaiveDate,
    total_sales: Decimal,
    total_quantity: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct EmployeeSalesTotalRow {
    employee_id: Uuid,
    employee_name: String,
    total_sales: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct EmployeeSaleLineRow {
    sale_id: Uuid,
    product_name: String,
    sale_date: NaiveDate,
    sale_quantity: i32,
    unit_price: Decimal,
}

/// Everything the sale transaction needs, gathered by the checkout checks.
#[derive(Debug)]
pub struct SaleDraft<'a> {
    pub seller: &'a Employee,
    pub product: &'a Product,
    pub stock_id: StockId,
    pub stock_reference_id: StockReferenceId,
    pub acquisition_value: Decimal,
    pub quantity: i32,
}

/// A committed sale.
#[derive(Debug, Clone)]
pub struct RecordedSale {
    pub sale: Sale,
    pub remaining_stock: i32,
    pub low_stock_notified: bool,
}

/// Result of the locked stock re-check inside the sale transaction.
#[derive(Debug)]
pub enum SaleOutcome {
    Recorded(RecordedSale),
    /// Stock changed between the checks and the lock; nothing was written.
    Rejected { available: bool, quantity: i32 },
}

/// Repository for sale database operations.
pub struct SaleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SaleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a sale in one transaction.
    ///
    /// Locks the stock row, re-checks availability and quantity, then
    /// inserts the sale, decrements stock and product history, appends the
    /// snapshot and the audit row, raises a low-stock notification when
    /// needed and empties the seller's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the stock row disappeared.
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// committed in that case.
    pub async fn record(&self, draft: &SaleDraft<'_>) -> Result<SaleOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (available, quantity): (bool, i32) = sqlx::query_as(
            "SELECT available, quantity FROM stock WHERE id = $1 FOR UPDATE",
        )
        .bind(draft.stock_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if !available || draft.quantity > quantity {
            tx.rollback().await?;
            return Ok(SaleOutcome::Rejected {
                available,
                quantity,
            });
        }

        let sale = sqlx::query_as::<_, SaleRow>(
            r"
            INSERT INTO sale (product_id, employee_id, stock_reference_id, sale_quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_id, employee_id, stock_reference_id, sale_quantity,
                      sale_date, is_archived, archived_at, created_at
            ",
        )
        .bind(draft.product.id)
        .bind(draft.seller.id)
        .bind(draft.stock_reference_id)
        .bind(draft.quantity)
        .fetch_one(&mut *tx)
        .await?;

        let remaining_stock: i32 = sqlx::query_scalar(
            "UPDATE stock SET quantity = quantity - $2 WHERE id = $1 RETURNING quantity",
        )
        .bind(draft.stock_id)
        .bind(draft.quantity)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            UPDATE product_history
            SET product_quantity = product_quantity - $2, updated_at = NOW()
            WHERE product_id = $1
            ",
        )
        .bind(draft.product.id)
        .bind(draft.quantity)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO sale_history (
                sale_id, product_id, product_name, product_price, product_acquisition_value,
                sale_quantity, sale_total_value, employee_id, employee_name, employee_email,
                employee_address, stock_reference_id, sale_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(sale.id)
        .bind(draft.product.id)
        .bind(&draft.product.name)
        .bind(draft.product.price)
        .bind(draft.acquisition_value)
        .bind(draft.quantity)
        .bind(line_total(draft.product.price, draft.quantity))
        .bind(draft.seller.id)
        .bind(&draft.seller.name)
        .bind(&draft.seller.email)
        .bind(&draft.seller.address)
        .bind(draft.stock_reference_id)
        .bind(sale.sale_date)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO action_history (employee_id, action, sale_id) VALUES ($1, $2, $3)")
            .bind(draft.seller.id)
            .bind(format!(
                "Sold {} x {}",
                draft.quantity, draft.product.name
            ))
            .bind(sale.id)
            .execute(&mut *tx)
            .await?;

        let low_stock_notified = remaining_stock < LOW_STOCK_THRESHOLD;
        if low_stock_notified {
            sqlx::query(
                r"
                INSERT INTO notification (employee_id, stock_reference_id, product_id,
                                          product_description, message)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(draft.seller.id)
            .bind(draft.stock_reference_id)
            .bind(draft.product.id)
            .bind(&draft.product.description)
            .bind(low_stock_message(&draft.product.name))
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r"
            DELETE FROM cart_item
            WHERE cart_id IN (SELECT id FROM cart WHERE employee_id = $1)
            ",
        )
        .bind(draft.seller.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SaleOutcome::Recorded(RecordedSale {
            sale: sale.into(),
            remaining_stock,
            low_stock_notified,
        }))
    }

    /// List all sales, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Sale>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r"
            SELECT id, product_id, employee_id, stock_reference_id, sale_quantity,
                   sale_date, is_archived, archived_at, created_at
            FROM sale
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Unarchived sales of an employee, priced from their snapshots.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unarchived_lines_for(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<EmployeeSaleLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, EmployeeSaleLineRow>(
            r"
            SELECT s.id AS sale_id, h.product_name, s.sale_date, s.sale_quantity,
                   h.product_price AS unit_price
            FROM sale s
            JOIN sale_history h ON h.sale_id = s.id
            WHERE s.employee_id = $1 AND NOT s.is_archived
            ORDER BY h.product_name, s.created_at
            ",
        )
        .bind(employee_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| EmployeeSaleLine {
                sale_id: SaleId::new(row.sale_id),
                product_name: row.product_name,
                sale_date: row.sale_date,
                sale_quantity: row.sale_quantity,
                unit_price: row.unit_price,
            })
            .collect())
    }

    /// Sales value and units per day across all snapshots.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn aggregate_by_date(&self) -> Result<Vec<DailySales>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailySalesRow>(
            r"
            SELECT sale_date AS date,
                   COALESCE(SUM(sale_total_value), 0) AS total_sales,
                   COALESCE(SUM(sale_quantity), 0)::BIGINT AS total_quantity
            FROM sale_history
            GROUP BY sale_date
            ORDER BY sale_date
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DailySales {
                date: row.date,
                total_sales: row.total_sales,
                total_quantity: row.total_quantity,
            })
            .collect())
    }

    /// Lifetime sales value per employee with the `employee` role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals_by_employee(&self) -> Result<Vec<EmployeeSalesTotal>, RepositoryError> {
        let rows = sqlx::query_as::<_, EmployeeSalesTotalRow>(
            r"
            SELECT e.id AS employee_id, e.name AS employee_name,
                   COALESCE(SUM(h.sale_total_value), 0) AS total_sales
            FROM employee e
            LEFT JOIN sale_history h ON h.employee_id = e.id
            WHERE e.role = $1
            GROUP BY e.id, e.name
            ORDER BY e.name
            ",
        )
        .bind(EmployeeRole::Employee)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| EmployeeSalesTotal {
                employee_id: EmployeeId::new(row.employee_id),
                employee_name: row.employee_name,
                total_sales: row.total_sales,
            })
            .collect())
    }

    /// Snapshots of one employee's sales on a day.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn snapshots_for_employee_on(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> Result<Vec<SaleSnapshot>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleSnapshotRow>(
            r"
            SELECT id, sale_id, product_id, product_name, product_price,
                   product_acquisition_value, sale_quantity, sale_total_value, employee_id,
                   employee_name, employee_email, employee_address, stock_reference_id,
                   sale_date
            FROM sale_history
            WHERE employee_id = $1 AND sale_date = $2
            ORDER BY id
            ",
        )
        .bind(employee_id)
        .bind(date)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Snapshots of one sale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn snapshots_for_sale(
        &self,
        sale_id: SaleId,
    ) -> Result<Vec<SaleSnapshot>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleSnapshotRow>(
            r"
            SELECT id, sale_id, product_id, product_name, product_price,
                   product_acquisition_value, sale_quantity, sale_total_value, employee_id,
                   employee_name, employee_email, employee_address, stock_reference_id,
                   sale_date
            FROM sale_history
            WHERE sale_id = $1
            ORDER BY id
            ",
        )
        .bind(sale_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Archive every unarchived sale.
    ///
    /// Returns the number of sales archived.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn archive_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE sale SET is_archived = TRUE, archived_at = NOW() WHERE NOT is_archived",
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
