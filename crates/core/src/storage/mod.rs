pub mod lock;
pub mod recommendations;
pub mod stock;

use crate::error::StorageError;

pub async fn migrate(pool: &sqlx::PgPool) -> Result<(), StorageError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
