//! Database migrations.
//!
//! Migrations live in `crates/api/migrations/` and are embedded in the API
//! crate, so this binary always applies the schema the server expects.

use stockroom_api::db::MIGRATOR;

use super::{CommandError, connect};

/// Apply every pending migration.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
