use crate::foundation::RaffleError;
use log::debug;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry an async operation with a fixed delay.
///
/// Errors that are not retryable are returned at once.
pub async fn retry<F, Fut, T>(mut attempts: usize, delay: Duration, mut op: F) -> Result<T, RaffleError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RaffleError>>,
{
    let mut last_err = None;
    while attempts > 0 {
        match op().await {
            Ok(v) => return Ok(v),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) => {
                attempts -= 1;
                if attempts > 0 {
                    debug!("retrying after error attempts_left={} delay_ms={} error={}", attempts, delay.as_millis(), err);
                    sleep(delay).await;
                }
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| RaffleError::Message("retry exhausted".to_string())))
}
