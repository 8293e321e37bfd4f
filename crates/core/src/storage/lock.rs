use crate::error::StorageError;
use chrono::{Datelike, NaiveDate};

// Advisory locks are scoped to the Postgres session. This is a best-effort
// guard against two scheduler triggers overlapping for the same scheduled day.
const LOCK_NAMESPACE: i64 = 0x5449_434B_4552; // "TICKER" as a hex-ish namespace.

fn lock_key_for_date(run_date: NaiveDate) -> i64 {
    LOCK_NAMESPACE ^ (run_date.num_days_from_ce() as i64)
}

pub async fn try_acquire_run_date_lock(
    pool: &sqlx::PgPool,
    run_date: NaiveDate,
) -> Result<bool, StorageError> {
    let key = lock_key_for_date(run_date);
    let acquired: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .persistent(false)
        .bind(key)
        .fetch_one(pool)
        .await?;
    Ok(acquired.0)
}

pub async fn release_run_date_lock(
    pool: &sqlx::PgPool,
    run_date: NaiveDate,
) -> Result<(), StorageError> {
    let key = lock_key_for_date(run_date);
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .persistent(false)
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_keys_differ_per_date() {
        let a = lock_key_for_date(NaiveDate::from_ymd_opt(2026, 8, 27).unwrap());
        let b = lock_key_for_date(NaiveDate::from_ymd_opt(2026, 8, 28).unwrap());
        assert_ne!(a, b);
    }
}
