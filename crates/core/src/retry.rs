use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Backoff policy for the external-call stages. Injected into the
/// orchestrator so tests can run with a zero-delay single-attempt policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no sleeping. For tests and dry runs.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let exp = self.base_delay.saturating_mul(1u32 << shift);
        let capped = exp.min(self.max_delay);
        if self.jitter && !capped.is_zero() {
            // 50-150% of the nominal delay, so repeated runs don't line up.
            capped.mul_f64(rand::thread_rng().gen_range(0.5..1.5))
        } else {
            capped
        }
    }
}

/// Runs `op` until it succeeds, returns a non-retryable error, or the
/// attempt budget is spent. The caller supplies the retryability predicate,
/// so each error taxonomy keeps its own classification.
pub async fn retry<T, E, F, Fut>(
    policy: RetryPolicy,
    label: &'static str,
    is_retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts.max(1) || !is_retryable(&err) {
                    return Err(err);
                }
                let backoff = policy.delay_for(attempt);
                tracing::warn!(label, attempt, ?backoff, error = %err, "transient failure; retrying");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
