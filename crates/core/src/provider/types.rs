use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire shape of the Alpha Vantage TIME_SERIES_DAILY_ADJUSTED response.
/// The provider reports errors in-band on HTTP 200: `Error Message` for
/// rejected requests, `Note`/`Information` for rate limiting.
#[derive(Debug, Clone, Deserialize)]
pub struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)", default)]
    pub series: BTreeMap<NaiveDate, RawDailyBar>,

    #[serde(rename = "Error Message", default)]
    pub error_message: Option<String>,

    #[serde(rename = "Note", default)]
    pub note: Option<String>,

    #[serde(rename = "Information", default)]
    pub information: Option<String>,
}

/// One day's bar exactly as the provider sends it: numbered keys, every
/// value a string. Fields are optional here so that a missing required
/// field surfaces as a `NormalizationError` rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDailyBar {
    #[serde(rename = "1. open", default)]
    pub open: Option<String>,

    #[serde(rename = "2. high", default)]
    pub high: Option<String>,

    #[serde(rename = "3. low", default)]
    pub low: Option<String>,

    #[serde(rename = "4. close", default)]
    pub close: Option<String>,

    #[serde(rename = "5. adjusted close", default)]
    pub adjusted_close: Option<String>,

    #[serde(rename = "6. volume", default)]
    pub volume: Option<String>,

    #[serde(rename = "7. dividend amount", default)]
    pub dividend_amount: Option<String>,

    #[serde(rename = "8. split coefficient", default)]
    pub split_coefficient: Option<String>,
}
