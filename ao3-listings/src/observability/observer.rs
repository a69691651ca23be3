//! Progress callbacks for traversals.
//!
//! Long listings take minutes because of the politeness delay, so callers
//! get a side channel for progress. Nothing reported here is part of the
//! traversal result.

use std::time::Duration;

use crate::extract::AnomalyKind;
use crate::traversal::StopReason;

/// Why the fetcher is about to wait and retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCause {
    /// The edge proxy reported the origin as overloaded.
    Overload,
    /// The archive returned its short "Retry later" page.
    RetryLater,
}

/// Observability callbacks for a traversal.
pub trait TraversalObserver: Send + Sync {
    /// Called after a page has been fetched and processed.
    fn on_page_loaded(&self, url: &str, page_no: usize, ids_found: usize, duration_ms: f64);

    /// Called before the fetcher sleeps and retries.
    fn on_retry(&self, url: &str, cause: RetryCause, delay: Duration);

    /// Called for each deleted or locked list item.
    fn on_anomaly(&self, url: &str, kind: AnomalyKind, total: usize);

    /// Called once when the traversal stops.
    fn on_stop(&self, reason: StopReason, pages: usize, ids_found: usize);
}

/// No-op implementation of [`TraversalObserver`].
#[derive(Debug, Clone, Default)]
pub struct NoOpTraversalObserver;

impl TraversalObserver for NoOpTraversalObserver {
    fn on_page_loaded(&self, _url: &str, _page_no: usize, _ids_found: usize, _duration_ms: f64) {}
    fn on_retry(&self, _url: &str, _cause: RetryCause, _delay: Duration) {}
    fn on_anomaly(&self, _url: &str, _kind: AnomalyKind, _total: usize) {}
    fn on_stop(&self, _reason: StopReason, _pages: usize, _ids_found: usize) {}
}

/// Observer that reports through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingTraversalObserver;

impl TraversalObserver for LoggingTraversalObserver {
    fn on_page_loaded(&self, url: &str, page_no: usize, ids_found: usize, duration_ms: f64) {
        tracing::info!(url, page_no, ids_found, duration_ms, "Loaded listing page");
    }

    fn on_retry(&self, url: &str, cause: RetryCause, delay: Duration) {
        tracing::warn!(
            url,
            ?cause,
            delay_secs = delay.as_secs_f64(),
            "Archive busy, waiting before retry"
        );
    }

    fn on_anomaly(&self, url: &str, kind: AnomalyKind, total: usize) {
        tracing::debug!(url, ?kind, total, "Skipped unavailable work");
    }

    fn on_stop(&self, reason: StopReason, pages: usize, ids_found: usize) {
        tracing::info!(?reason, pages, ids_found, "Listing traversal finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_observer() {
        let observer = NoOpTraversalObserver;
        observer.on_page_loaded("https://archiveofourown.org/works?page=1", 1, 20, 12.5);
        observer.on_retry("u", RetryCause::Overload, Duration::from_secs(10));
        observer.on_anomaly("u", AnomalyKind::Deleted, 1);
        observer.on_stop(StopReason::NoNextPage, 1, 20);
    }

    #[test]
    fn test_logging_observer_without_subscriber() {
        let observer = LoggingTraversalObserver;
        observer.on_page_loaded("u", 2, 40, 1.0);
        observer.on_retry("u", RetryCause::RetryLater, Duration::from_secs(180));
        observer.on_anomaly("u", AnomalyKind::Locked, 3);
        observer.on_stop(StopReason::Cap, 2, 40);
    }
}
