use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use ticker_digest_core::config::Settings;
use ticker_digest_core::llm::openai::{build_prompt, OpenAiClient};
use ticker_digest_core::normalize;
use ticker_digest_core::pipeline::{Orchestrator, PgRunStore, RunOutcome};
use ticker_digest_core::provider::alpha_vantage::AlphaVantageClient;
use ticker_digest_core::provider::MarketDataClient;
use ticker_digest_core::retry::RetryPolicy;
use ticker_digest_core::storage;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ticker_digest_worker")]
struct Args {
    /// Symbol to track. Defaults to the STOCK_SYMBOL environment variable.
    #[arg(long)]
    symbol: Option<String>,

    /// Fetch and normalize, print the would-be analysis prompt, write nothing.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env();
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match run(&settings, &args).await {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(outcome)) => {
            if outcome.is_success() {
                tracing::info!(%outcome, "daily run finished");
            } else {
                tracing::error!(%outcome, "daily run finished degraded");
                sentry::capture_message(&outcome.to_string(), sentry::Level::Error);
            }
            ExitCode::from(outcome.exit_code())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{err:#}"), "daily run aborted before the pipeline");
            ExitCode::from(1)
        }
    }
}

async fn run(settings: &Settings, args: &Args) -> anyhow::Result<Option<RunOutcome>> {
    let symbol = settings.resolve_symbol(args.symbol.as_deref())?;
    let provider = AlphaVantageClient::from_settings(settings)?;

    if args.dry_run {
        dry_run(&provider, &symbol).await?;
        return Ok(None);
    }

    // Fail on missing configuration before the first network call.
    let llm = OpenAiClient::from_settings(settings)?;
    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    storage::migrate(&pool).await?;

    let run_date = chrono::Utc::now().date_naive();
    let acquired = storage::lock::try_acquire_run_date_lock(&pool, run_date).await?;
    if !acquired {
        tracing::warn!(%run_date, "run lock not acquired; another run in progress");
        return Ok(None);
    }

    let orchestrator = Orchestrator::new(
        provider,
        llm,
        PgRunStore::new(pool.clone()),
        symbol,
        RetryPolicy::default(),
    );

    let outcome = orchestrator.run().await;

    let _ = storage::lock::release_run_date_lock(&pool, run_date).await;
    pool.close().await;

    Ok(Some(outcome))
}

async fn dry_run(provider: &AlphaVantageClient, symbol: &str) -> anyhow::Result<()> {
    let latest = provider
        .fetch_latest_bar(symbol)
        .await
        .context("dry-run fetch failed")?;
    let record = normalize::normalize(symbol, latest.trading_date, &latest.bar)
        .context("dry-run normalization failed")?;

    tracing::info!(
        trading_date = %record.trading_date,
        close = %record.close,
        volume = record.volume,
        dry_run = true,
        "normalized latest bar (not persisted)"
    );
    println!("{}", build_prompt(&record, &[]));

    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
