//! Action history queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use stockroom_core::{ActionHistoryId, EmployeeId, SaleId};

use super::RepositoryError;
use crate::models::ActionHistory;

#[derive(Debug, sqlx::FromRow)]
struct ActionHistoryRow {
    id: Uuid,
    employee_id: Uuid,
    action: String,
    sale_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<ActionHistoryRow> for ActionHistory {
    fn from(row: ActionHistoryRow) -> Self {
        Self {
            id: ActionHistoryId::new(row.id),
            employee_id: EmployeeId::new(row.employee_id),
            action: row.action,
            sale_id: row.sale_id.map(SaleId::new),
            created_at: row.created_at,
        }
    }
}

pub struct AuditRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All actions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<ActionHistory>, RepositoryError> {
        let rows = sqlx::query_as::<_, ActionHistoryRow>(
            r"
            SELECT id, employee_id, action, sale_id, created_at
            FROM action_history
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Actions of one employee, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<ActionHistory>, RepositoryError> {
        let rows = sqlx::query_as::<_, ActionHistoryRow>(
            r"
            SELECT id, employee_id, action, sale_id, created_at
            FROM action_history
            WHERE employee_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(employee_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
