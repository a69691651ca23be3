//! Cancellation token for cooperative cancellation.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;

use crate::errors::{ArchiveError, Result};

/// A token for cooperative cancellation of a traversal.
///
/// The fetcher's retry loop never gives up on its own, so this token is the
/// only way to stop a traversal stuck behind a long backoff. Every wait in
/// the fetcher races it, and the driver checks it between pages.
///
/// Cancellation is idempotent - only the first cancellation reason is kept.
#[derive(Default)]
pub struct CancellationToken {
    /// Whether cancellation has been requested.
    cancelled: AtomicBool,
    /// The reason for cancellation (first one wins). Written before the
    /// flag is set.
    reason: RwLock<Option<String>>,
    /// Wakes tasks parked in [`CancellationToken::cancelled`].
    notify: Notify,
}

impl CancellationToken {
    /// Creates a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation with a reason and wakes every pending wait.
    ///
    /// This is idempotent - only the first reason is kept.
    pub fn cancel(&self, reason: impl Into<String>) {
        {
            let mut slot = self.reason.write();
            if self.is_cancelled() {
                return;
            }
            *slot = Some(reason.into());
            self.cancelled.store(true, Ordering::SeqCst);
        }
        debug!(reason = ?self.reason(), "Cancellation requested");
        self.notify.notify_waiters();
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }

    /// Fails with [`ArchiveError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(self.cancelled_error())
        } else {
            Ok(())
        }
    }

    /// Completes once cancellation has been requested.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Sleeps for `duration` unless cancelled first.
    ///
    /// A zero duration only checks the token.
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.check()?;
        if duration.is_zero() {
            return Ok(());
        }
        tokio::select! {
            () = tokio::time::sleep(duration) => Ok(()),
            () = self.cancelled() => Err(self.cancelled_error()),
        }
    }

    fn cancelled_error(&self) -> ArchiveError {
        ArchiveError::Cancelled(self.reason().unwrap_or_else(|| "cancelled".to_string()))
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}
