//! Page fetching with the archive's retry policy.
//!
//! One call to [`PageFetcher::fetch`] is one logical GET. Physically it may
//! take many requests: the archive sits behind an edge proxy that answers
//! with an overload status under load, and its own rate limiter answers with
//! a tiny "Retry later" page. Both are retried without limit; anything else
//! that is not a 200 is fatal.

use std::sync::Arc;
use std::time::Duration;

use crate::cancellation::CancellationToken;
use crate::config::RetryPolicy;
use crate::errors::{ArchiveError, Result};
use crate::observability::{LoggingTraversalObserver, RetryCause, TraversalObserver};
use crate::session::{HttpResponse, Session};

/// Body of a successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The URL that was requested.
    pub url: String,
    /// Response body.
    pub body: String,
    /// Number of physical requests it took.
    pub attempts: usize,
}

/// How the fetcher reacts to one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// Return the body.
    Success,
    /// Wait and retry.
    Retry(RetryCause),
    /// Fail without retrying.
    Fatal,
}

impl RetryPolicy {
    /// Classifies a response. Order matters: success, overload, rate limit,
    /// then everything else is fatal.
    #[must_use]
    pub fn classify(&self, response: &HttpResponse) -> ResponseClass {
        if response.is_ok() {
            ResponseClass::Success
        } else if self.is_overload_status(response.status_code) {
            ResponseClass::Retry(RetryCause::Overload)
        } else if self.is_retry_later_body(&response.text) {
            ResponseClass::Retry(RetryCause::RetryLater)
        } else {
            ResponseClass::Fatal
        }
    }

    /// Backoff for a retry cause.
    #[must_use]
    pub fn delay_for(&self, cause: RetryCause) -> Duration {
        match cause {
            RetryCause::Overload => self.overload_delay(),
            RetryCause::RetryLater => self.retry_later_delay(),
        }
    }
}

/// Fetches listing pages through a shared session.
#[derive(Clone)]
pub struct PageFetcher {
    session: Arc<dyn Session>,
    policy: RetryPolicy,
    cancel: Arc<CancellationToken>,
    observer: Arc<dyn TraversalObserver>,
}

impl PageFetcher {
    /// Creates a fetcher with its own cancellation token, reporting progress
    /// through [`LoggingTraversalObserver`].
    #[must_use]
    pub fn new(session: Arc<dyn Session>, policy: RetryPolicy) -> Self {
        Self {
            session,
            policy,
            cancel: Arc::new(CancellationToken::new()),
            observer: Arc::new(LoggingTraversalObserver),
        }
    }

    /// Shares a cancellation token with the caller.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: Arc<CancellationToken>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets the progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn TraversalObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The retry policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The cancellation token checked by every wait.
    #[must_use]
    pub const fn cancellation(&self) -> &Arc<CancellationToken> {
        &self.cancel
    }

    /// The progress observer.
    #[must_use]
    pub fn observer(&self) -> &dyn TraversalObserver {
        self.observer.as_ref()
    }

    pub(crate) fn shared_observer(&self) -> Arc<dyn TraversalObserver> {
        Arc::clone(&self.observer)
    }

    /// Fetches `url`, which must already carry its page number.
    ///
    /// Waits the politeness delay before every attempt. Never gives up on
    /// transient conditions; only cancellation interrupts the loop.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let mut attempts = 0;

        loop {
            self.cancel.sleep(self.policy.politeness_delay()).await?;
            attempts += 1;

            let response = self.session.get(url).await?;
            match self.policy.classify(&response) {
                ResponseClass::Success => {
                    return Ok(FetchedPage {
                        url: url.to_string(),
                        body: response.text,
                        attempts,
                    });
                }
                ResponseClass::Retry(cause) => {
                    let delay = self.policy.delay_for(cause);
                    self.observer.on_retry(url, cause, delay);
                    self.cancel.sleep(delay).await?;
                }
                ResponseClass::Fatal => {
                    tracing::error!(
                        url,
                        status = response.status_code,
                        reason = %response.reason,
                        "Fatal response from archive"
                    );
                    return Err(ArchiveError::Fetch {
                        url: url.to_string(),
                        status: response.status_code,
                        reason: response.reason,
                    });
                }
            }
        }
    }
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("policy", &self.policy)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}
