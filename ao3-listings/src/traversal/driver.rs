//! The pagination driver.
//!
//! A [`Traversal`] walks a listing one page at a time:
//!
//! ```text
//! FETCHING(1) -> EXTRACTING -> CONTINUE -> FETCHING(2) -> ...
//!                           \-> CUTOFF_STOP | CAP_STOP | NO_NEXT_STOP
//! ```
//!
//! Pages are fetched strictly in order and never twice. Items are appended
//! in presentation order; a series entry is replaced in place by the works
//! of that series when expansion is on.

use futures::stream::{self, BoxStream, StreamExt};

use super::outcome::{ListedItem, ListingOutcome, PageReport, StopReason};
use super::request::ListingRequest;
use super::series::expand_series;
use crate::config::BASE_URL;
use crate::errors::{ArchiveError, Result};
use crate::extract::{EntryKind, ListItem, PageScan, RecordExtractor};
use crate::fetcher::PageFetcher;
use crate::observability::SpanTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fetching(usize),
    Stopped(StopReason),
    Failed,
}

/// State of one walk over a listing.
#[derive(Debug)]
pub struct Traversal {
    fetcher: PageFetcher,
    extractor: RecordExtractor,
    request: ListingRequest,
    base_url: String,
    phase: Phase,
    items: Vec<ListedItem>,
    anomalies: usize,
    pages_fetched: usize,
}

impl Traversal {
    /// Creates a traversal positioned before page 1.
    #[must_use]
    pub fn new(fetcher: PageFetcher, extractor: RecordExtractor, request: ListingRequest) -> Self {
        Self {
            fetcher,
            extractor,
            request,
            base_url: BASE_URL.to_string(),
            phase: Phase::Fetching(1),
            items: Vec::new(),
            anomalies: 0,
            pages_fetched: 0,
        }
    }

    /// Sets the archive root used to build series listings.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The request being served.
    #[must_use]
    pub const fn request(&self) -> &ListingRequest {
        &self.request
    }

    /// Items collected so far.
    #[must_use]
    pub fn items(&self) -> &[ListedItem] {
        &self.items
    }

    /// Deleted or locked items skipped so far.
    #[must_use]
    pub const fn anomalies(&self) -> usize {
        self.anomalies
    }

    /// Pages fetched so far, series pages included.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Why the traversal stopped, once it has.
    #[must_use]
    pub const fn stop_reason(&self) -> Option<StopReason> {
        match self.phase {
            Phase::Stopped(reason) => Some(reason),
            Phase::Fetching(_) | Phase::Failed => None,
        }
    }

    /// Whether further calls to [`next_page`](Self::next_page) can do work.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        !matches!(self.phase, Phase::Fetching(_))
    }

    /// Fetches and processes the next page.
    ///
    /// Returns `Ok(None)` once the traversal has stopped. An error ends the
    /// traversal; items collected before it stay available through
    /// [`items`](Self::items), and later calls return [`ArchiveError::Aborted`].
    pub async fn next_page(&mut self) -> Result<Option<PageReport>> {
        let page_no = match self.phase {
            Phase::Fetching(page_no) => page_no,
            Phase::Stopped(_) => return Ok(None),
            Phase::Failed => return Err(ArchiveError::Aborted),
        };

        match self.process_page(page_no).await {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                self.phase = Phase::Failed;
                tracing::error!(page_no, error = %e, "Listing traversal failed");
                Err(e)
            }
        }
    }

    /// Runs to completion.
    pub async fn run(mut self) -> Result<ListingOutcome> {
        while self.next_page().await?.is_some() {}
        self.into_outcome().ok_or(ArchiveError::Aborted)
    }

    /// The outcome of a stopped traversal; `None` if it has not stopped.
    #[must_use]
    pub fn into_outcome(self) -> Option<ListingOutcome> {
        let stop = self.stop_reason()?;
        Some(ListingOutcome {
            items: self.items,
            anomalies: self.anomalies,
            pages_fetched: self.pages_fetched,
            stop,
        })
    }

    /// Streams items as pages are processed.
    ///
    /// The stream ends after the stop condition, or after yielding the first
    /// error. Items a failing page accepted before the error are yielded
    /// ahead of it.
    pub fn into_stream(self) -> BoxStream<'static, Result<ListedItem>> {
        stream::unfold(Some(self), |state| async move {
            let mut traversal = state?;
            let start_len = traversal.items.len();
            match traversal.next_page().await {
                Ok(Some(report)) => {
                    let batch: Vec<Result<ListedItem>> = report.items.into_iter().map(Ok).collect();
                    Some((stream::iter(batch), Some(traversal)))
                }
                Ok(None) => None,
                Err(e) => {
                    let batch: Vec<Result<ListedItem>> = traversal.items[start_len..]
                        .iter()
                        .cloned()
                        .map(Ok)
                        .chain(std::iter::once(Err(e)))
                        .collect();
                    Some((stream::iter(batch), None))
                }
            }
        })
        .flatten()
        .boxed()
    }

    async fn process_page(&mut self, page_no: usize) -> Result<PageReport> {
        self.fetcher.cancellation().check()?;

        let url = self.request.template.page(page_no);
        let timer = SpanTimer::start(url.clone());
        let page = self.fetcher.fetch(&url).await?;
        let scan = self.extractor.scan(&page.body, self.request.date_mode);
        self.pages_fetched += 1;

        let start_len = self.items.len();
        let start_anomalies = self.anomalies;
        let has_next_page = scan.has_next_page;

        let stop = match self.consume(&url, scan).await? {
            Some(reason) => Some(reason),
            None if !has_next_page => Some(StopReason::NoNextPage),
            None => None,
        };

        self.phase = match stop {
            Some(reason) => Phase::Stopped(reason),
            None => Phase::Fetching(page_no + 1),
        };

        self.fetcher
            .observer()
            .on_page_loaded(&url, page_no, self.items.len(), timer.finish());
        if let Some(reason) = stop {
            tracing::debug!(page_no, ?reason, "Stopping listing traversal");
            self.fetcher
                .observer()
                .on_stop(reason, self.pages_fetched, self.items.len());
        }

        Ok(PageReport {
            page_no,
            url,
            items: self.items[start_len..].to_vec(),
            anomalies: self.anomalies - start_anomalies,
            stop,
        })
    }

    /// Applies cutoff, target, expansion and cap to one page's items.
    ///
    /// The page's trailing extraction error only surfaces when every item
    /// before it was consumed without stopping.
    async fn consume(&mut self, url: &str, scan: PageScan) -> Result<Option<StopReason>> {
        for item in scan.items {
            let entry = match item {
                ListItem::Anomaly(kind) => {
                    self.anomalies += 1;
                    self.fetcher.observer().on_anomaly(url, kind, self.anomalies);
                    continue;
                }
                ListItem::Entry(entry) => entry,
            };

            if self.request.is_past_cutoff(entry.date()) {
                return Ok(Some(StopReason::Cutoff));
            }

            if entry.kind() == self.request.target {
                self.items.push(ListedItem::from(entry));
            } else if entry.kind() == EntryKind::Series && self.request.expand_series {
                let series = expand_series(
                    self.fetcher.clone(),
                    self.extractor.clone(),
                    self.base_url.clone(),
                    entry.id().to_string(),
                )
                .await?;
                self.anomalies += series.anomalies;
                self.pages_fetched += series.pages_fetched;
                let date = entry.date();
                self.items
                    .extend(series.items.into_iter().map(|item| ListedItem { date, ..item }));
            } else {
                continue;
            }

            if let Some(cap) = self.request.cap() {
                if self.items.len() >= cap {
                    self.items.truncate(cap);
                    return Ok(Some(StopReason::Cap));
                }
            }
        }

        match scan.malformed {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}
