pub mod openai;
pub mod parse;

use crate::domain::{DailyStockRecord, StockInsight};
use crate::error::AnalysisError;

/// Turns the latest persisted record (plus a short window of prior records
/// for trend context) into an analyst summary with up to three
/// recommendations. Fails only on transport/auth problems; content that
/// arrives but does not match the expected shape degrades to a fallback
/// summary instead of an error.
#[async_trait::async_trait]
pub trait InsightClient: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate_insight(
        &self,
        latest: &DailyStockRecord,
        history: &[DailyStockRecord],
    ) -> Result<StockInsight, AnalysisError>;
}
