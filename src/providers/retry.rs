// Retry logic with exponential backoff

use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;

const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): base, 2×base, 4×base, …
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Run `f` until it succeeds or the policy's attempts are used up.
pub async fn with_retry<F, Fut, T>(policy: RetryPolicy, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt + 1 >= attempts => return Err(e),
            Err(e) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Request failed (attempt {}/{}), retrying in {:?}: {:#}",
                    attempt + 1,
                    attempts,
                    delay,
                    e
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
