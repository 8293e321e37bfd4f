use crate::config::Settings;
use crate::error::{ConfigError, ProviderError};
use crate::provider::types::DailySeriesResponse;
use crate::provider::{LatestBar, MarketDataClient};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
const DEFAULT_FUNCTION: &str = "TIME_SERIES_DAILY_ADJUSTED";
const DEFAULT_OUTPUT_SIZE: &str = "compact";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let api_key = settings.require_alpha_vantage_api_key()?.to_string();

        let base_url = std::env::var("ALPHA_VANTAGE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("ALPHA_VANTAGE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|_| ConfigError {
                name: "ALPHA_VANTAGE_TIMEOUT_SECS",
            })?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/query", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl MarketDataClient for AlphaVantageClient {
    fn provider_name(&self) -> &'static str {
        "alpha_vantage"
    }

    async fn fetch_latest_bar(&self, symbol: &str) -> Result<LatestBar, ProviderError> {
        let res = self
            .http
            .get(self.url())
            .query(&[
                ("function", DEFAULT_FUNCTION),
                ("symbol", symbol),
                ("outputsize", DEFAULT_OUTPUT_SIZE),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(ProviderError::Transport)?;

        let status = res.status();
        let text = res.text().await.map_err(ProviderError::Transport)?;

        if !status.is_success() {
            return Err(ProviderError::Http { status, body: text });
        }

        let parsed = serde_json::from_str::<DailySeriesResponse>(&text)
            .map_err(|err| ProviderError::Malformed(format!("{err}: {text}")))?;

        latest_from_response(parsed)
    }
}

/// Classifies the provider's in-band errors and extracts the most recent
/// dated entry. An empty series is ambiguous (symbol unknown? holiday?
/// silent quota exhaustion?), so it is always rejected rather than defaulted.
pub fn latest_from_response(response: DailySeriesResponse) -> Result<LatestBar, ProviderError> {
    if let Some(message) = response.error_message {
        return Err(ProviderError::Rejected(message));
    }
    if let Some(note) = response.note.or(response.information) {
        return Err(ProviderError::RateLimited(note));
    }

    let (trading_date, bar) = response
        .series
        .into_iter()
        .next_back()
        .ok_or(ProviderError::EmptySeries)?;

    Ok(LatestBar { trading_date, bar })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(v: serde_json::Value) -> DailySeriesResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn picks_the_most_recent_date() {
        let parsed = response(json!({
            "Time Series (Daily)": {
                "2026-08-25": {"4. close": "100.00"},
                "2026-08-27": {"4. close": "123.45"},
                "2026-08-26": {"4. close": "110.00"}
            }
        }));

        let latest = latest_from_response(parsed).unwrap();
        assert_eq!(latest.trading_date.to_string(), "2026-08-27");
        assert_eq!(latest.bar.close.as_deref(), Some("123.45"));
    }

    #[test]
    fn empty_series_is_an_error_not_a_default() {
        let parsed = response(json!({"Time Series (Daily)": {}}));
        assert!(matches!(
            latest_from_response(parsed),
            Err(ProviderError::EmptySeries)
        ));
    }

    #[test]
    fn in_band_error_message_maps_to_rejected() {
        let parsed = response(json!({"Error Message": "Invalid API call."}));
        assert!(matches!(
            latest_from_response(parsed),
            Err(ProviderError::Rejected(_))
        ));
    }

    #[test]
    fn rate_limit_note_maps_to_rate_limited() {
        let parsed = response(json!({
            "Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."
        }));
        let err = latest_from_response(parsed).unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited(_)));
        assert!(err.is_retryable());
    }
}
