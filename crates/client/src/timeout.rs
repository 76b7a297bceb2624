//! Deadline wrapper for backend calls.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Run `future`, failing with [`ClientError::Timeout`] if it outlives
/// `duration`. The future is dropped on timeout.
///
/// # Errors
///
/// Returns the future's own error, or `ClientError::Timeout`.
pub async fn with_timeout<T, F>(duration: Duration, future: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| ClientError::Timeout)?
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_result_through() {
        let value = with_timeout(Duration::from_secs(1), async { Ok::<_, ClientError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_times_out() {
        let result = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, ClientError>(())
        })
        .await;
        assert!(matches!(result, Err(ClientError::Timeout)));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Operation timed out after 1 minute. Please try again."
        );
    }
}
