//! Backoff for transient review feed failures. Throttling is never retried:
//! a 429 ends collection for the product.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Transient feed failures worth another attempt: network errors and 5xx
/// responses. A rate limit is final so the feed's throttle is respected.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Runs `operation`, sleeping `backoff_base_ms * 2^attempt` between
/// retriable failures, for at most `max_retries` extra attempts.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let delay_ms = backoff_base_ms.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            error = %err,
            "review feed request failed, backing off"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn throttled() -> ScraperError {
        ScraperError::RateLimited {
            domain: "feedback.aliexpress.com".to_owned(),
            retry_after_secs: 0,
        }
    }

    async fn run_counting(
        max_retries: u32,
        outcomes: Vec<Result<u32, ScraperError>>,
    ) -> (Result<u32, ScraperError>, u32) {
        let calls = Arc::new(AtomicU32::new(0));
        let outcomes = Arc::new(std::sync::Mutex::new(outcomes.into_iter()));
        let counter = Arc::clone(&calls);
        let result = retry_with_backoff(max_retries, 0, || {
            let counter = Arc::clone(&counter);
            let outcomes = Arc::clone(&outcomes);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                outcomes.lock().unwrap().next().unwrap_or(Ok(0))
            }
        })
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    fn server_error() -> ScraperError {
        ScraperError::UnexpectedStatus {
            status: 503,
            url: "https://feedback.aliexpress.com/".to_owned(),
        }
    }

    #[tokio::test]
    async fn throttling_is_not_retried() {
        let (result, calls) = run_counting(3, vec![Err(throttled()), Ok(7)]).await;
        assert!(matches!(result, Err(ScraperError::RateLimited { .. })));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let (result, calls) = run_counting(
            1,
            vec![Err(server_error()), Err(server_error()), Err(server_error())],
        )
        .await;
        assert!(matches!(
            result,
            Err(ScraperError::UnexpectedStatus { status: 503, .. })
        ));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let (result, calls) = run_counting(
            3,
            vec![Err(ScraperError::UnexpectedStatus {
                status: 403,
                url: "https://feedback.aliexpress.com/".to_owned(),
            })],
        )
        .await;
        assert!(matches!(
            result,
            Err(ScraperError::UnexpectedStatus { status: 403, .. })
        ));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let (result, calls) = run_counting(
            2,
            vec![
                Err(ScraperError::UnexpectedStatus {
                    status: 502,
                    url: "https://feedback.aliexpress.com/".to_owned(),
                }),
                Ok(1),
            ],
        )
        .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls, 2);
    }
}
