use crate::domain::StockInsight;
use crate::error::StorageError;

/// Append-only by design: reruns for the same `analysis_date` add rows
/// rather than replacing earlier ones, so a second run is a second opinion.
/// Returns the generated surrogate id.
pub async fn append(pool: &sqlx::PgPool, insight: &StockInsight) -> Result<i64, StorageError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO daily_recommendations (\
             analysis_date, llm_summary, recommendation_1, recommendation_2, recommendation_3\
         ) VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .persistent(false)
    .bind(insight.analysis_date)
    .bind(&insight.summary)
    .bind(insight.recommendation(0))
    .bind(insight.recommendation(1))
    .bind(insight.recommendation(2))
    .fetch_one(pool)
    .await?;

    Ok(id)
}
