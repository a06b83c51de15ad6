//! Notification repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use stockroom_core::{EmployeeId, NotificationId, ProductId, StockReferenceId};

use super::RepositoryError;
use crate::models::Notification;

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    employee_id: Uuid,
    stock_reference_id: Uuid,
    product_id: Option<Uuid>,
    product_description: String,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::new(row.id),
            employee_id: EmployeeId::new(row.employee_id),
            stock_reference_id: StockReferenceId::new(row.stock_reference_id),
            product_id: row.product_id.map(ProductId::new),
            product_description: row.product_description,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Unread notifications of a reference, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_unread(
        &self,
        stock_reference_id: StockReferenceId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r"
            SELECT id, employee_id, stock_reference_id, product_id, product_description,
                   message, is_read, created_at
            FROM notification
            WHERE stock_reference_id = $1 AND NOT is_read
            ORDER BY created_at DESC
            ",
        )
        .bind(stock_reference_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Mark one of an employee's notifications read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist
    /// or belongs to someone else.
    pub async fn mark_read(
        &self,
        id: NotificationId,
        employee_id: EmployeeId,
    ) -> Result<Notification, RepositoryError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r"
            UPDATE notification
            SET is_read = TRUE
            WHERE id = $1 AND employee_id = $2
            RETURNING id, employee_id, stock_reference_id, product_id, product_description,
                      message, is_read, created_at
            ",
        )
        .bind(id)
        .bind(employee_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }
}
