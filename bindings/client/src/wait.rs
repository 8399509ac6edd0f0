use crate::error::{ClientError, ClientResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// How often readiness predicates are re-evaluated against the page.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polls `predicate` until it returns `true` or `timeout` elapses.
///
/// The predicate is always evaluated at least once, so a condition that already holds succeeds
/// even with a zero timeout. Predicate errors propagate immediately; expiry produces
/// [`ClientError::ReadinessTimeout`] naming `condition`.
pub async fn wait_for<F, Fut>(condition: &str, timeout: Duration, mut predicate: F) -> ClientResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<bool>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if predicate().await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ClientError::ReadinessTimeout {
                condition: condition.to_string(),
                timeout,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
