//! CLI command implementations.

pub mod employee;
pub mod migrate;
pub mod sales;

use sqlx::PgPool;
use thiserror::Error;

use stockroom_api::config::{ConfigError, get_database_url};
use stockroom_api::db::{self, RepositoryError};
use stockroom_api::services::auth::AuthError;

/// Errors a command can end with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("could not read password: {0}")]
    Input(#[from] std::io::Error),
}

/// Connect to the database named by `STOCKROOM_DATABASE_URL` or `DATABASE_URL`.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("STOCKROOM_DATABASE_URL")?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
