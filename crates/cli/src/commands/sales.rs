//! Sale archival.

use stockroom_api::db::SaleRepository;

use super::{CommandError, connect};

/// Archive every unarchived sale and log how many were touched.
pub async fn archive() -> Result<u64, CommandError> {
    let pool = connect().await?;

    let archived = SaleRepository::new(&pool).archive_all().await?;
    tracing::info!(archived, "Sales archived");
    Ok(archived)
}
