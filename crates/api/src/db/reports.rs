//! Report totals computed in SQL.

use rust_decimal::Decimal;
use sqlx::PgPool;

use stockroom_core::StockReferenceId;

use super::RepositoryError;

/// Sales and acquisition totals of a reference, before profit math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct SalesTotals {
    pub sales: Decimal,
    pub acquisition: Decimal,
}

pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Sale value and acquisition cost of everything sold from a reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_totals(
        &self,
        stock_reference_id: StockReferenceId,
    ) -> Result<SalesTotals, RepositoryError> {
        let totals = sqlx::query_as::<_, SalesTotals>(
            r"
            SELECT COALESCE(SUM(sale_total_value), 0) AS sales,
                   COALESCE(SUM(sale_quantity * product_acquisition_value), 0) AS acquisition
            FROM sale_history
            WHERE stock_reference_id = $1
            ",
        )
        .bind(stock_reference_id)
        .fetch_one(self.pool)
        .await?;

        Ok(totals)
    }

    /// Acquisition value of the quantities recorded in a reference's product history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_value(
        &self,
        stock_reference_id: StockReferenceId,
    ) -> Result<Decimal, RepositoryError> {
        let value: Decimal = sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(acquisition_value * product_quantity), 0)
            FROM product_history
            WHERE stock_reference_id = $1
            ",
        )
        .bind(stock_reference_id)
        .fetch_one(self.pool)
        .await?;

        Ok(value)
    }

    /// Value of every sale ever recorded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_sales_value(&self) -> Result<Decimal, RepositoryError> {
        let value: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(sale_total_value), 0) FROM sale_history")
                .fetch_one(self.pool)
                .await?;

        Ok(value)
    }
}
