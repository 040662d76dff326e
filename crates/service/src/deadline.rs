use std::future::Future;
use std::time::Duration;

use crate::error::ServiceError;

/// Run one remote call under the configured per-call timeout.
pub(crate) async fn within<T, E>(
    limit: Duration,
    op: &'static str,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, ServiceError>
where
    ServiceError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(ServiceError::from),
        Err(_) => {
            tracing::warn!(op, timeout_ms = limit.as_millis(), "remote call timed out");
            Err(ServiceError::Timeout(op))
        },
    }
}
