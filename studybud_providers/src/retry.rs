//! Bounded retry for backend calls.

use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Run `operation`, retrying once per entry in `delays` after sleeping that
/// long. The total number of attempts is `delays.len() + 1`; the final
/// attempt's error is returned as-is. An empty slice means a single attempt.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, delays: &[Duration]) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = delays.len() + 1;

    for (i, delay) in delays.iter().enumerate() {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(
                    "Request failed (attempt {}/{attempts}): {e}. Retrying after {}s...",
                    i + 1,
                    delay.as_secs()
                );
                sleep(*delay).await;
            }
        }
    }

    operation().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SHORT: &[Duration] = &[Duration::from_millis(1), Duration::from_millis(1)];

    #[tokio::test]
    async fn retry_succeeds_on_first_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), String>(())
                }
            },
            SHORT,
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_succeeds_after_failures() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), String> = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    if count < 3 { Err(String::from("fail")) } else { Ok(()) }
                }
            },
            SHORT,
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_fails_after_all_attempts() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), String> = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(String::from("fail"))
                }
            },
            SHORT,
        )
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_delay_list_means_single_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), String> = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(String::from("fail"))
                }
            },
            &[],
        )
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
