use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical representation of one trading day's bar for the tracked symbol.
/// `trading_date` is the natural key; at most one row per date exists in
/// storage, and re-fetching the same date overwrites the rest of the fields.
/// `last_updated` is owned by the database (set on every write) and is
/// deliberately absent here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyStockRecord {
    pub trading_date: NaiveDate,
    pub symbol: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub adjusted_close: Decimal,
    pub volume: i64,
    pub dividend_amount: Decimal,
    pub split_coefficient: Decimal,
}
