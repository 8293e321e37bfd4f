use crate::config::Settings;
use crate::domain::{DailyStockRecord, StockInsight};
use crate::error::{AnalysisError, ConfigError};
use crate::llm::parse;
use crate::llm::InsightClient;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const SYSTEM_PROMPT: &str = "You are a helpful fintech analyst.";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let api_key = settings.require_openai_api_key()?.to_string();
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let max_tokens = std::env::var("OPENAI_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|_| ConfigError {
                name: "OPENAI_TIMEOUT_SECS",
            })?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            max_tokens,
        })
    }

    async fn chat(&self, req: ChatCompletionRequest) -> Result<ChatCompletionResponse, AnalysisError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", self.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer).map_err(|_| AnalysisError::Auth {
                status: StatusCode::UNAUTHORIZED,
            })?,
        );

        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .map_err(AnalysisError::Transport)?;

        let status = res.status();
        let text = res.text().await.map_err(AnalysisError::Transport)?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AnalysisError::Auth { status });
        }
        if !status.is_success() {
            return Err(AnalysisError::Http { status, body: text });
        }

        serde_json::from_str::<ChatCompletionResponse>(&text)
            .map_err(|_| AnalysisError::EmptyResponse)
    }
}

#[async_trait::async_trait]
impl InsightClient for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_insight(
        &self,
        latest: &DailyStockRecord,
        history: &[DailyStockRecord],
    ) -> Result<StockInsight, AnalysisError> {
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: build_prompt(latest, history),
                },
            ],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: self.max_tokens,
        };

        let res = self.chat(req).await?;
        let content = response_text(&res).ok_or(AnalysisError::EmptyResponse)?;

        let parsed = parse::parse_insight(&content);
        if parsed.recommendations.is_empty() && parsed.summary == content.trim() {
            tracing::warn!(
                trading_date = %latest.trading_date,
                "LLM output did not match the expected shape; storing raw text as summary"
            );
        }

        Ok(StockInsight::new(
            latest.trading_date,
            parsed.summary,
            parsed.recommendations,
        ))
    }
}

/// Deterministic prompt: same record and history always produce the same
/// text, so a rerun asks the model the same question.
pub fn build_prompt(latest: &DailyStockRecord, history: &[DailyStockRecord]) -> String {
    let mut prompt = format!(
        "Based on the following daily performance data for {} on {}, provide a short summary \
         and up to 3 actionable recommendations for this stock's investors.\n\n\
         - Open Price: ${}\n\
         - High Price: ${}\n\
         - Low Price: ${}\n\
         - Close Price: ${}\n\
         - Adjusted Close Price: ${}\n\
         - Volume: {}\n",
        latest.symbol,
        latest.trading_date,
        latest.open,
        latest.high,
        latest.low,
        latest.close,
        latest.adjusted_close,
        latest.volume,
    );

    if !history.is_empty() {
        prompt.push_str("\nRecent closes (most recent first):\n");
        for record in history {
            let _ = writeln!(prompt, "- {}: ${}", record.trading_date, record.close);
        }
    }

    prompt.push_str(
        "\nRespond in exactly this format:\n\
         Summary: [your short summary]\n\
         Recommendation 1: [first actionable recommendation]\n\
         Recommendation 2: [second actionable recommendation]\n\
         Recommendation 3: [third actionable recommendation]\n",
    );
    prompt
}

fn response_text(res: &ChatCompletionResponse) -> Option<String> {
    let content = res.choices.first()?.message.content.as_deref()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
