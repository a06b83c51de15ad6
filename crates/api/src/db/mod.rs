//! Database operations for the Stockroom `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `employee`, `employee_history`, `login_activity` - staff and sign-in audit
//! - `stock_reference` - stock periods; at most one active
//! - `product`, `product_history` - catalog and acquisition records
//! - `stock` - per-reference ledger of sellable quantities
//! - `sale`, `sale_history`, `action_history` - sales, snapshots and audit
//! - `cart`, `cart_item` - one cart per employee
//! - `notification` - low-stock alerts
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/`, embedded in [`MIGRATOR`]
//! and run via:
//! ```bash
//! stockroom migrate
//! ```

pub mod audit;
pub mod carts;
pub mod employees;
pub mod notifications;
pub mod products;
pub mod reports;
pub mod sales;
pub mod stock;
pub mod stock_references;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use audit::AuditRepository;
pub use carts::CartRepository;
pub use employees::{EmployeeRepository, EmployeeUpdate, NewEmployee};
pub use notifications::NotificationRepository;
pub use products::{NewProduct, ProductRepository, ProductUpdate};
pub use reports::{ReportRepository, SalesTotals};
pub use sales::{RecordedSale, SaleDraft, SaleOutcome, SaleRepository};
pub use stock::{StockRepository, TopUp};
pub use stock_references::StockReferenceRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_unique(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_string());
        }
        Self::Database(err)
    }

    /// Map a Postgres `numeric_value_out_of_range` (22003) to `Conflict`,
    /// anything else to `Database`.
    pub(crate) fn from_out_of_range(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.code().as_deref() == Some("22003")
        {
            return Self::Conflict(message.to_string());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
