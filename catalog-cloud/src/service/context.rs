//! Per-call cancellation and deadline

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::db::StoreResult;
use crate::error::CatalogError;

/// Carries cancellation and an optional deadline through one service call.
///
/// Store futures are raced against both; the losing future is dropped, which
/// rolls back any open transaction.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl OpContext {
    /// No deadline, never cancelled unless [`cancel`](Self::cancel) is called
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Tie this context to an outer token (e.g. server shutdown)
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Run one store call named `op` under this context
    pub async fn run<T, F>(&self, op: &'static str, fut: F) -> Result<T, CatalogError>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::warn!(op, "Operation cancelled");
                Err(CatalogError::Cancelled { op })
            }
            _ = expired => {
                tracing::warn!(op, "Operation deadline exceeded");
                Err(CatalogError::Cancelled { op })
            }
            res = fut => res.map_err(|source| CatalogError::Store { op, source }),
        }
    }
}
