//! Stock reference repository.
//!
//! A unique partial index keeps at most one reference active; activation
//! swaps the flag inside one transaction so the index never sees two.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use stockroom_core::StockReferenceId;

use super::RepositoryError;
use crate::models::StockReference;

#[derive(Debug, sqlx::FromRow)]
struct StockReferenceRow {
    id: Uuid,
    name: String,
    description: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StockReferenceRow> for StockReference {
    fn from(row: StockReferenceRow) -> Self {
        Self {
            id: StockReferenceId::new(row.id),
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for stock reference database operations.
pub struct StockReferenceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StockReferenceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all references, active first, then by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<StockReference>, RepositoryError> {
        let rows = sqlx::query_as::<_, StockReferenceRow>(
            r"
            SELECT id, name, description, is_active, created_at, updated_at
            FROM stock_reference
            ORDER BY is_active DESC, name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a reference by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: StockReferenceId,
    ) -> Result<Option<StockReference>, RepositoryError> {
        let row = sqlx::query_as::<_, StockReferenceRow>(
            r"
            SELECT id, name, description, is_active, created_at, updated_at
            FROM stock_reference
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get the active reference, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self) -> Result<Option<StockReference>, RepositoryError> {
        let row = sqlx::query_as::<_, StockReferenceRow>(
            r"
            SELECT id, name, description, is_active, created_at, updated_at
            FROM stock_reference
            WHERE is_active
            ",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create an inactive reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(
        &self,
        name: &str,
        description: &str,
    ) -> Result<StockReference, RepositoryError> {
        let row = sqlx::query_as::<_, StockReferenceRow>(
            r"
            INSERT INTO stock_reference (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, is_active, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "stock reference name already exists"))?;

        Ok(row.into())
    }

    /// Rename or re-describe a reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the reference does not exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: StockReferenceId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<StockReference, RepositoryError> {
        let row = sqlx::query_as::<_, StockReferenceRow>(
            r"
            UPDATE stock_reference
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, is_active, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "stock reference name already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a reference and everything scoped to it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the reference does not exist.
    pub async fn delete(&self, id: StockReferenceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM stock_reference WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Make `id` the only active reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the reference does not exist;
    /// the previous active reference is left untouched in that case.
    pub async fn activate(&self, id: StockReferenceId) -> Result<StockReference, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            UPDATE stock_reference
            SET is_active = FALSE, updated_at = NOW()
            WHERE is_active AND id <> $1
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, StockReferenceRow>(
            r"
            UPDATE stock_reference
            SET is_active = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, is_active, created_at, updated_at
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Deactivate a reference. Afterwards no reference may be active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the reference does not exist.
    pub async fn deactivate(
        &self,
        id: StockReferenceId,
    ) -> Result<StockReference, RepositoryError> {
        let row = sqlx::query_as::<_, StockReferenceRow>(
            r"
            UPDATE stock_reference
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, is_active, created_at, updated_at
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }
}
