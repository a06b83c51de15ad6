//! Employee repository: staff records, their history and login attempts.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use stockroom_core::{
    Contact, Email, EmployeeHistoryId, EmployeeId, EmployeeRole, LoginStatus, StockReferenceId,
};

use super::RepositoryError;
use crate::models::{Employee, EmployeeHistory, LoginActivity};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    name: String,
    contact: String,
    address: String,
    role: EmployeeRole,
    is_active: bool,
    stock_reference_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = RepositoryError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let contact = Contact::parse(&row.contact).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid contact in database: {e}"))
        })?;

        Ok(Self {
            id: EmployeeId::new(row.id),
            username: row.username,
            email,
            password_hash: row.password_hash,
            name: row.name,
            contact,
            address: row.address,
            role: row.role,
            is_active: row.is_active,
            stock_reference_id: row.stock_reference_id.map(StockReferenceId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EmployeeHistoryRow {
    id: Uuid,
    employee_id: Option<Uuid>,
    name: String,
    contact: String,
    address: String,
    role: EmployeeRole,
    recorded_at: DateTime<Utc>,
}

impl From<EmployeeHistoryRow> for EmployeeHistory {
    fn from(row: EmployeeHistoryRow) -> Self {
        Self {
            id: EmployeeHistoryId::new(row.id),
            employee_id: row.employee_id.map(EmployeeId::new),
            name: row.name,
            contact: row.contact,
            address: row.address,
            role: row.role,
            recorded_at: row.recorded_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LoginActivityRow {
    id: i64,
    employee_id: Option<Uuid>,
    username: String,
    status: LoginStatus,
    ip_address: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<LoginActivityRow> for LoginActivity {
    fn from(row: LoginActivityRow) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id.map(EmployeeId::new),
            username: row.username,
            status: row.status,
            ip_address: row.ip_address,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Validated input for a new employee. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub username: String,
    pub email: Email,
    pub password_hash: String,
    pub name: String,
    pub contact: Contact,
    pub address: String,
    pub role: EmployeeRole,
}

/// Partial update of an employee. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub role: Option<EmployeeRole>,
    pub email: Option<Email>,
    pub is_active: Option<bool>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for employee database operations.
pub struct EmployeeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EmployeeRepository<'a> {
    /// Create a new employee repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all employees ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<Employee>, RepositoryError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r"
            SELECT id, username, email, password_hash, name, contact, address,
                   role, is_active, stock_reference_id, created_at, updated_at
            FROM employee
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an employee by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r"
            SELECT id, username, email, password_hash, name, contact, address,
                   role, is_active, stock_reference_id, created_at, updated_at
            FROM employee
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an employee by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Employee>, RepositoryError> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r"
            SELECT id, username, email, password_hash, name, contact, address,
                   role, is_active, stock_reference_id, created_at, updated_at
            FROM employee
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create an employee together with its first history row and its cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(&self, new: &NewEmployee) -> Result<Employee, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, EmployeeRow>(
            r"
            INSERT INTO employee (username, email, password_hash, name, contact, address, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, email, password_hash, name, contact, address,
                      role, is_active, stock_reference_id, created_at, updated_at
            ",
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.name)
        .bind(&new.contact)
        .bind(&new.address)
        .bind(new.role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "username or email already exists"))?;

        let employee = Employee::try_from(row)?;
        insert_history(&mut tx, &employee).await?;

        sqlx::query("INSERT INTO cart (employee_id) VALUES ($1)")
            .bind(employee.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(employee)
    }

    /// Apply a partial update. A history row is written when the name or
    /// role changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the employee does not exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    pub async fn update(
        &self,
        id: EmployeeId,
        update: &EmployeeUpdate,
    ) -> Result<Employee, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, EmployeeRow>(
            r"
            SELECT id, username, email, password_hash, name, contact, address,
                   role, is_active, stock_reference_id, created_at, updated_at
            FROM employee
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let profile_changed = update.name.as_ref().is_some_and(|n| *n != current.name)
            || update.role.is_some_and(|r| r != current.role);

        let row = sqlx::query_as::<_, EmployeeRow>(
            r"
            UPDATE employee
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                email = COALESCE($4, email),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, password_hash, name, contact, address,
                      role, is_active, stock_reference_id, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.role)
        .bind(update.email.as_ref())
        .bind(update.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email already exists"))?;

        let employee = Employee::try_from(row)?;
        if profile_changed {
            insert_history(&mut tx, &employee).await?;
        }

        tx.commit().await?;
        Ok(employee)
    }

    /// Delete an employee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the employee does not exist.
    pub async fn delete(&self, id: EmployeeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM employee WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Assign the employee to a stock reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the employee does not exist.
    pub async fn set_sector(
        &self,
        id: EmployeeId,
        sector: StockReferenceId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE employee SET stock_reference_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(sector)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List every employee history row, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_history(&self) -> Result<Vec<EmployeeHistory>, RepositoryError> {
        let rows = sqlx::query_as::<_, EmployeeHistoryRow>(
            r"
            SELECT id, employee_id, name, contact, address, role, recorded_at
            FROM employee_history
            ORDER BY recorded_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Record a login attempt.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record_login(
        &self,
        employee_id: Option<EmployeeId>,
        username: &str,
        status: LoginStatus,
        ip_address: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO login_activity (employee_id, username, status, ip_address)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(employee_id)
        .bind(username)
        .bind(status)
        .bind(ip_address)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// List the most recent login attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_login_activity(
        &self,
        limit: i64,
    ) -> Result<Vec<LoginActivity>, RepositoryError> {
        let rows = sqlx::query_as::<_, LoginActivityRow>(
            r"
            SELECT id, employee_id, username, status, ip_address, created_at
            FROM login_activity
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

async fn insert_history(
    tx: &mut Transaction<'_, Postgres>,
    employee: &Employee,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO employee_history (employee_id, name, contact, address, role)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(employee.id)
    .bind(&employee.name)
    .bind(&employee.contact)
    .bind(&employee.address)
    .bind(employee.role)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
