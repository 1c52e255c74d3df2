//! Bounded fixed-interval polling primitive

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::{Result, SiwfError};

/// Repeatedly invoke `probe` until it succeeds or `timeout` elapses.
///
/// Every rejection is transient and retried after `interval`; only the
/// timeout is terminal. A success returns immediately with no further
/// delay. No backoff: the interval is fixed. The terminal error carries
/// the number of attempts that were made.
pub async fn poll<T, E, F, Fut>(mut probe: F, interval: Duration, timeout: Duration) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: fmt::Display,
{
    let start = Instant::now();
    let mut attempts: u32 = 0;

    while start.elapsed() < timeout {
        attempts += 1;
        match probe().await {
            Ok(value) => {
                debug!(attempts, "Poll succeeded");
                return Ok(value);
            }
            Err(e) => {
                debug!(attempt = attempts, error = %e, "Poll attempt failed");
                tokio::time::sleep(interval).await;
            }
        }
    }

    Err(SiwfError::PollTimeoutExceeded { attempts })
}
