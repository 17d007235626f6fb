//! Deadline helpers for async operations
//!
//! ```ignore
//! let result = with_timeout(Duration::from_secs(300), scanner.run(..), "scan").await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{DriftError, Result};

/// Run `future`, failing with `DriftError::Timeout` once `timeout` elapses
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DriftError::timeout(operation_name, timeout)),
    }
}

/// Like [`with_timeout`] but skips the deadline entirely when `timeout` is `None`
pub async fn with_optional_timeout<T, F>(
    timeout: Option<Duration>,
    future: F,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        Some(timeout) => with_timeout(timeout, future, operation_name).await,
        None => future.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, DriftError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, DriftError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), DriftError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_no_deadline() {
        let result = with_optional_timeout(None, async { Ok::<_, DriftError>("done") }, "scan").await;
        assert_eq!(result.unwrap(), "done");
    }
}
