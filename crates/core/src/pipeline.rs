use crate::domain::{DailyStockRecord, StockInsight};
use crate::error::{AnalysisError, ProviderError, StorageError};
use crate::llm::InsightClient;
use crate::normalize;
use crate::provider::MarketDataClient;
use crate::retry::{retry, RetryPolicy};
use crate::storage;
use chrono::NaiveDate;
use std::fmt;

/// How many prior records feed the analysis prompt as trend context.
const HISTORY_WINDOW: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Normalizing,
    Storing,
    Analyzing,
    Recording,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Normalizing => "normalizing",
            Stage::Storing => "storing",
            Stage::Analyzing => "analyzing",
            Stage::Recording => "recording",
        };
        f.write_str(name)
    }
}

/// Exactly one of these per invocation, mapped to distinct process exit
/// codes so the scheduler can tell the four terminal states apart.
#[derive(Debug)]
pub enum RunOutcome {
    /// Stock row upserted, insight appended.
    Success {
        trading_date: NaiveDate,
        insight_id: i64,
    },
    /// Stock row is durable but no insight was recorded for it.
    PartialSuccess {
        trading_date: NaiveDate,
        stage: Stage,
        reason: String,
    },
    /// Aborted before any write: both tables are untouched.
    NoOpFailure { stage: Stage, reason: String },
    /// Storage refused or became unreachable mid-run.
    HardFailure { stage: Stage, reason: String },
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Success { .. } => 0,
            RunOutcome::HardFailure { .. } => 1,
            RunOutcome::NoOpFailure { .. } => 2,
            RunOutcome::PartialSuccess { .. } => 3,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success { .. })
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Success {
                trading_date,
                insight_id,
            } => write!(f, "success: {trading_date} stored, insight #{insight_id}"),
            RunOutcome::PartialSuccess {
                trading_date,
                stage,
                reason,
            } => write!(
                f,
                "partial success: {trading_date} stored, {stage} failed: {reason}"
            ),
            RunOutcome::NoOpFailure { stage, reason } => {
                write!(f, "no-op failure in {stage}: {reason}")
            }
            RunOutcome::HardFailure { stage, reason } => {
                write!(f, "hard failure in {stage}: {reason}")
            }
        }
    }
}

/// Persistence seam of the pipeline. The Postgres implementation delegates
/// to `storage`; tests drive the orchestrator against an in-memory store.
#[async_trait::async_trait]
pub trait RunStore: Send + Sync {
    async fn upsert_daily_record(&self, record: &DailyStockRecord) -> Result<(), StorageError>;

    async fn append_insight(&self, insight: &StockInsight) -> Result<i64, StorageError>;

    async fn recent_records(&self, limit: i64) -> Result<Vec<DailyStockRecord>, StorageError>;
}

#[derive(Debug, Clone)]
pub struct PgRunStore {
    pool: sqlx::PgPool,
}

impl PgRunStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RunStore for PgRunStore {
    async fn upsert_daily_record(&self, record: &DailyStockRecord) -> Result<(), StorageError> {
        storage::stock::upsert(&self.pool, record).await
    }

    async fn append_insight(&self, insight: &StockInsight) -> Result<i64, StorageError> {
        storage::recommendations::append(&self.pool, insight).await
    }

    async fn recent_records(&self, limit: i64) -> Result<Vec<DailyStockRecord>, StorageError> {
        storage::stock::recent(&self.pool, limit).await
    }
}

/// Owns one run: fetch, normalize, store, analyze, record, strictly in that
/// order. Components never call each other directly; every cross-component
/// hop goes through here, which is also the only place that decides whether
/// a failure aborts the run, gets retried, or degrades to partial success.
pub struct Orchestrator<P, L, S> {
    provider: P,
    insight: L,
    store: S,
    symbol: String,
    retry: RetryPolicy,
}

impl<P, L, S> Orchestrator<P, L, S>
where
    P: MarketDataClient,
    L: InsightClient,
    S: RunStore,
{
    pub fn new(provider: P, insight: L, store: S, symbol: String, retry: RetryPolicy) -> Self {
        Self {
            provider,
            insight,
            store,
            symbol,
            retry,
        }
    }

    pub async fn run(&self) -> RunOutcome {
        // Fetching. A failure here is a clean no-op: nothing was written.
        let latest = match retry(
            self.retry,
            "fetch_latest_bar",
            ProviderError::is_retryable,
            || self.provider.fetch_latest_bar(&self.symbol),
        )
        .await
        {
            Ok(latest) => latest,
            Err(err) => {
                return RunOutcome::NoOpFailure {
                    stage: Stage::Fetching,
                    reason: err.to_string(),
                }
            }
        };
        tracing::info!(
            symbol = %self.symbol,
            provider = self.provider.provider_name(),
            trading_date = %latest.trading_date,
            "fetched latest daily bar"
        );

        // Normalizing. Never retried: a failure means provider schema drift.
        let record = match normalize::normalize(&self.symbol, latest.trading_date, &latest.bar) {
            Ok(record) => record,
            Err(err) => {
                return RunOutcome::NoOpFailure {
                    stage: Stage::Normalizing,
                    reason: err.to_string(),
                }
            }
        };

        // Storing. Connectivity errors retry; constraint errors fail at once.
        // Analysis must never run against data that is not durable.
        if let Err(err) = retry(
            self.retry,
            "upsert_daily_record",
            StorageError::is_retryable,
            || self.store.upsert_daily_record(&record),
        )
        .await
        {
            return RunOutcome::HardFailure {
                stage: Stage::Storing,
                reason: err.to_string(),
            };
        }
        tracing::info!(trading_date = %record.trading_date, "daily record persisted");

        // Trend context is best-effort; an unreadable history degrades to an
        // empty window rather than failing a run whose data is already stored.
        let history = match self.store.recent_records(HISTORY_WINDOW).await {
            Ok(records) => records
                .into_iter()
                .filter(|r| r.trading_date != record.trading_date)
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, "could not load history window; analyzing without it");
                Vec::new()
            }
        };

        // Analyzing. The stock row is already durable, so a transport/auth
        // failure here ends the run as a partial success, not a hard one.
        let insight = match retry(
            self.retry,
            "generate_insight",
            AnalysisError::is_retryable,
            || self.insight.generate_insight(&record, &history),
        )
        .await
        {
            Ok(insight) => insight,
            Err(err) => {
                return RunOutcome::PartialSuccess {
                    trading_date: record.trading_date,
                    stage: Stage::Analyzing,
                    reason: err.to_string(),
                }
            }
        };

        // Recording. No cross-store transaction exists: a failure here leaves
        // the stock row committed and reports the run as a hard failure.
        match retry(
            self.retry,
            "append_insight",
            StorageError::is_retryable,
            || self.store.append_insight(&insight),
        )
        .await
        {
            Ok(insight_id) => {
                tracing::info!(
                    trading_date = %record.trading_date,
                    insight_id,
                    model = self.insight.model_name(),
                    "insight recorded"
                );
                RunOutcome::Success {
                    trading_date: record.trading_date,
                    insight_id,
                }
            }
            Err(err) => RunOutcome::HardFailure {
                stage: Stage::Recording,
                reason: err.to_string(),
            },
        }
    }
}
