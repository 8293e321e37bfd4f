pub mod alpha_vantage;
pub mod types;

use crate::error::ProviderError;
use crate::provider::types::RawDailyBar;
use chrono::NaiveDate;

/// The most recent dated entry of the provider's daily series, still in the
/// provider's raw string-typed shape.
#[derive(Debug, Clone)]
pub struct LatestBar {
    pub trading_date: NaiveDate,
    pub bar: RawDailyBar,
}

/// One outbound call per run. Implementations perform no internal retries;
/// the orchestrator owns the retry budget.
#[async_trait::async_trait]
pub trait MarketDataClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_latest_bar(&self, symbol: &str) -> Result<LatestBar, ProviderError>;
}
