use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;

use crate::services::SourceError;

/// Why a bounded attempt produced no value
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("worker aborted: {0}")]
    Aborted(String),
}

impl AttemptError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptError::TimedOut(_))
    }
}

/// Run `work` on its own task and wait for it at most `limit`
///
/// On expiry the task's cancellation token fires and the task is aborted,
/// so the work stops instead of finishing unobserved in the background.
/// Dropping the returned future (e.g. a client disconnect) cancels and
/// aborts the task as well.
pub async fn run_bounded<F, T>(limit: Duration, work: F) -> Result<T, AttemptError>
where
    F: Future<Output = Result<T, SourceError>> + Send + 'static,
    T: Send + 'static,
{
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();
    let worker_token = token.child_token();

    // The token only fires once nobody is waiting for the result
    let mut handle = AbortOnDropHandle::new(tokio::spawn(async move {
        tokio::select! {
            _ = worker_token.cancelled() => std::future::pending().await,
            result = work => result.map_err(AttemptError::Source),
        }
    }));

    match tokio::time::timeout(limit, &mut handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(AttemptError::Aborted(join_error.to_string())),
        Err(_) => {
            token.cancel();
            handle.abort();
            Err(AttemptError::TimedOut(limit))
        }
    }
}
