//! Retry with capped exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

const MAX_DELAY: Duration = Duration::from_secs(30);

/// Run `op` up to `attempts` times, doubling `base_delay` between tries.
///
/// The final error is returned unchanged once attempts are exhausted.
pub async fn with_retry<T, E, F, Fut>(attempts: u32, base_delay: Duration, mut op: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut delay = base_delay;
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                warn!(attempt, error = %e, "attempt failed, retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
                attempt += 1;
            }
        }
    }
}
