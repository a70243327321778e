use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::common::{EngineResult, ReviewEngineError};

/// Bound an engine operation by `timeout`.
///
/// On expiry the inner future is dropped mid-flight. Any open
/// `sqlx::Transaction` inside it rolls back on drop, so nothing is committed.
///
/// Transactional callers return the open transaction from `fut` and commit
/// after this returns. Expiry then always means "nothing written", and a
/// caller may retry. A commit or autocommitted statement awaited inside
/// `fut` has an unknown outcome on expiry; only idempotent writes (the
/// moderation toggles) run that way.
pub async fn with_deadline<T, F>(operation: &str, timeout: Duration, fut: F) -> EngineResult<T>
where
    F: Future<Output = EngineResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = timeout.as_millis() as u64, "Operation deadline exceeded");
            Err(ReviewEngineError::StoreUnavailable(format!(
                "{} exceeded deadline of {}ms",
                operation,
                timeout.as_millis()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_fast_results() {
        let result = with_deadline("fast", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn passes_through_inner_errors() {
        let result: EngineResult<()> = with_deadline("fails", Duration::from_secs(1), async {
            Err(ReviewEngineError::InvalidInput("bad".into()))
        })
        .await;
        assert!(matches!(result, Err(ReviewEngineError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn slow_operations_become_store_unavailable() {
        let result: EngineResult<()> = with_deadline("slow", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ReviewEngineError::StoreUnavailable(_))));
    }
}
