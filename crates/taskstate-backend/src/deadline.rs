//! Call-boundary deadlines.

use std::future::Future;
use std::time::Duration;

use taskstate_core::StateError;

/// Run a backend operation under a deadline.
///
/// An expired deadline drops the in-flight exchange and is reported as
/// `Unreachable`: the store may or may not have applied the request.
pub async fn with_deadline<T, F>(deadline: Duration, operation: F) -> Result<T, StateError>
where
    F: Future<Output = Result<T, StateError>>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(StateError::Unreachable(format!(
            "deadline of {}ms exceeded",
            deadline.as_millis()
        ))),
    }
}
