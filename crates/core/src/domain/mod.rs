pub mod insight;
pub mod record;

pub use insight::StockInsight;
pub use record::DailyStockRecord;
