use std::time::Duration;

use cortex_core::errors::LlmError;
use tracing::warn;

/// Retry an adapter call up to `max_retries` times with exponential backoff,
/// doubling from `base_delay` and capping at 10s. Only `LlmError::Transient`
/// is retried; a `Permanent` error or the final attempt propagates as-is.
pub async fn retry_transient<F, Fut, T>(
    max_retries: u32,
    base_delay: Duration,
    mut attempt: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, LlmError>>,
{
    let mut delay = base_delay;
    let mut last_err = None;
    for attempt_number in 0..=max_retries {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(LlmError::Transient { reason }) => {
                warn!(attempt_number, %reason, "transient LLM error, retrying");
                last_err = Some(LlmError::Transient { reason });
                if attempt_number == max_retries {
                    break;
                }
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(Duration::from_secs(10));
            }
            Err(other) => return Err(other),
        }
    }
    Err(last_err.unwrap_or(LlmError::RetriesExhausted {
        attempts: max_retries,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result = retry_transient(3, Duration::from_millis(1), move || {
            let c = c.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(LlmError::Transient {
                        reason: "timeout".to_string(),
                    })
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<i32, LlmError> = retry_transient(3, Duration::from_millis(1), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(LlmError::Permanent {
                    reason: "bad api key".to_string(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(LlmError::Permanent { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_retry_budget() {
        let result: Result<i32, LlmError> = retry_transient(2, Duration::from_millis(1), || async {
            Err(LlmError::Transient {
                reason: "rate limited".to_string(),
            })
        })
        .await;
        assert!(matches!(result, Err(LlmError::Transient { .. })));
    }
}
