//! Series expansion.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use super::driver::Traversal;
use super::outcome::{ListingOutcome, StopReason};
use super::request::ListingRequest;
use crate::errors::Result;
use crate::extract::{AnomalyKind, DateMode, RecordExtractor};
use crate::fetcher::PageFetcher;
use crate::observability::{RetryCause, TraversalObserver};

/// Passes retries of a nested walk through to the outer observer.
///
/// Page and stop events of the series listing are logged at debug level
/// only; the outer traversal reports the series as part of its own page.
/// Anomalies reach the outer observer through the outer total.
struct SeriesObserver {
    series_id: String,
    outer: Arc<dyn TraversalObserver>,
}

impl TraversalObserver for SeriesObserver {
    fn on_page_loaded(&self, url: &str, page_no: usize, ids_found: usize, duration_ms: f64) {
        tracing::debug!(
            series_id = %self.series_id,
            url,
            page_no,
            ids_found,
            duration_ms,
            "Loaded series page"
        );
    }

    fn on_retry(&self, url: &str, cause: RetryCause, delay: Duration) {
        self.outer.on_retry(url, cause, delay);
    }

    fn on_anomaly(&self, _url: &str, _kind: AnomalyKind, _total: usize) {}

    fn on_stop(&self, _reason: StopReason, _pages: usize, _ids_found: usize) {}
}

/// Collects every work of a series, in page order.
///
/// Runs a nested traversal over the series listing with expansion off and
/// no cap or cutoff; those belong to the outer traversal. Member dates are
/// not read: the caller dates the works by the series entry. The future is
/// boxed because the nested traversal is itself a [`Traversal`].
pub(crate) fn expand_series(
    fetcher: PageFetcher,
    extractor: RecordExtractor,
    base_url: String,
    series_id: String,
) -> BoxFuture<'static, Result<ListingOutcome>> {
    async move {
        tracing::debug!(series_id = %series_id, "Expanding series");
        let request =
            ListingRequest::series_members(&base_url, &series_id).with_date_mode(DateMode::None);
        let observer = SeriesObserver {
            series_id,
            outer: fetcher.shared_observer(),
        };
        let fetcher = fetcher.with_observer(Arc::new(observer));
        Traversal::new(fetcher, extractor, request)
            .with_base_url(base_url)
            .run()
            .await
    }
    .boxed()
}
