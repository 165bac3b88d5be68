//! Completion Timeout
//!
//! The HTTP client carries its own timeout; this wrapper bounds the whole
//! call (connect, send, body read) so a stalled provider always ends in
//! `ErrorKind::Timeout` instead of hanging.

use std::future::Future;
use std::time::Duration;

use crate::types::{CompletionError, DxError, Result};

/// Timeout configuration for remote operations
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Whole completion request
    pub completion: Duration,
    /// TCP connect only
    pub connection: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_secs(crate::constants::network::DEFAULT_TIMEOUT_SECS)
    }
}

impl TimeoutConfig {
    pub fn from_secs(completion_secs: u64) -> Self {
        let completion = Duration::from_secs(completion_secs);
        let connection =
            Duration::from_secs(crate::constants::network::CONNECTION_TIMEOUT_SECS).min(completion);
        Self {
            completion,
            connection,
        }
    }

    pub fn from_duration(completion: Duration) -> Self {
        Self {
            completion,
            connection: completion,
        }
    }
}

/// Execute an async operation with a timeout
///
/// Returns a `Timeout` completion error if the operation doesn't finish in time.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DxError::Completion(CompletionError::timeout(
            operation_name,
            timeout,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    #[test]
    fn test_timeout_config_defaults() {
        let config = TimeoutConfig::default();
        assert_eq!(config.completion.as_secs(), 30);
        assert_eq!(config.connection.as_secs(), 10);
    }

    #[test]
    fn test_connection_never_exceeds_completion() {
        let config = TimeoutConfig::from_secs(3);
        assert_eq!(config.connection.as_secs(), 3);
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, DxError>(42) },
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
                Ok::<_, DxError>(42)
            },
            "slow operation",
        )
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Timeout));
    }
}
