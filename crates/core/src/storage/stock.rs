use crate::domain::DailyStockRecord;
use crate::error::StorageError;

/// Idempotent write keyed by `trading_date`: the first run of a day inserts,
/// any rerun overwrites every non-key field and advances `last_updated`.
pub async fn upsert(pool: &sqlx::PgPool, record: &DailyStockRecord) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO daily_stock_data (\
             trading_date, symbol, open, high, low, close, adjusted_close, \
             volume, dividend_amount, split_coefficient\
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (trading_date) DO UPDATE SET \
             symbol = EXCLUDED.symbol, \
             open = EXCLUDED.open, \
             high = EXCLUDED.high, \
             low = EXCLUDED.low, \
             close = EXCLUDED.close, \
             adjusted_close = EXCLUDED.adjusted_close, \
             volume = EXCLUDED.volume, \
             dividend_amount = EXCLUDED.dividend_amount, \
             split_coefficient = EXCLUDED.split_coefficient, \
             last_updated = NOW()",
    )
    .persistent(false)
    .bind(record.trading_date)
    .bind(&record.symbol)
    .bind(record.open)
    .bind(record.high)
    .bind(record.low)
    .bind(record.close)
    .bind(record.adjusted_close)
    .bind(record.volume)
    .bind(record.dividend_amount)
    .bind(record.split_coefficient)
    .execute(pool)
    .await?;

    Ok(())
}

/// A short window of the most recent records, newest first. Feeds the trend
/// context of the analysis prompt.
pub async fn recent(pool: &sqlx::PgPool, limit: i64) -> Result<Vec<DailyStockRecord>, StorageError> {
    let records = sqlx::query_as::<_, DailyStockRecord>(
        "SELECT trading_date, symbol, open, high, low, close, adjusted_close, \
                volume, dividend_amount, split_coefficient \
         FROM daily_stock_data \
         ORDER BY trading_date DESC \
         LIMIT $1",
    )
    .persistent(false)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(records)
}
