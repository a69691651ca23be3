//! The archive client.
//!
//! [`Archive`] ties a session, the retry policy and the extractor together
//! and exposes one method per listing type. Each call builds a fresh
//! [`ListingRequest`] and runs it to completion; nothing is kept between
//! calls.

use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use std::sync::Arc;

use crate::cancellation::CancellationToken;
use crate::config::ArchiveConfig;
use crate::errors::Result;
use crate::extract::{DateMode, EntryKind, RecordExtractor};
use crate::fetcher::PageFetcher;
use crate::observability::TraversalObserver;
use crate::session::{HttpSession, Session};
use crate::traversal::{ListedItem, ListingOptions, ListingOutcome, ListingRequest, Traversal};
use crate::urls;

/// Client for the archive's paginated listings.
#[derive(Debug, Clone)]
pub struct Archive {
    config: ArchiveConfig,
    fetcher: PageFetcher,
    extractor: RecordExtractor,
}

impl Archive {
    /// Creates a client with an HTTP session built from `config`.
    pub fn new(config: ArchiveConfig) -> Result<Self> {
        let session = HttpSession::new(&config.session)?;
        Self::with_session(config, Arc::new(session))
    }

    /// Creates a client over an existing session.
    pub fn with_session(config: ArchiveConfig, session: Arc<dyn Session>) -> Result<Self> {
        let fetcher = PageFetcher::new(session, config.retry.clone());
        Ok(Self {
            config,
            fetcher,
            extractor: RecordExtractor::new()?,
        })
    }

    /// Shares a cancellation token with every traversal this client runs.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: Arc<CancellationToken>) -> Self {
        self.fetcher = self.fetcher.with_cancellation(cancel);
        self
    }

    /// Sets the progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn TraversalObserver>) -> Self {
        self.fetcher = self.fetcher.with_observer(observer);
        self
    }

    /// The client's configuration.
    #[must_use]
    pub const fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// The token that cancels this client's traversals.
    #[must_use]
    pub const fn cancellation(&self) -> &Arc<CancellationToken> {
        self.fetcher.cancellation()
    }

    fn base_url(&self) -> &str {
        &self.config.session.base_url
    }

    /// A traversal for `request`, not yet started.
    #[must_use]
    pub fn traversal(&self, request: ListingRequest) -> Traversal {
        Traversal::new(self.fetcher.clone(), self.extractor.clone(), request)
            .with_base_url(self.base_url())
    }

    /// Runs `request` to completion.
    pub async fn listing(&self, request: ListingRequest) -> Result<ListingOutcome> {
        tracing::info!(url = %request.template, "Starting listing traversal");
        self.traversal(request).run().await
    }

    /// Streams the identifiers of `request` as pages arrive.
    ///
    /// Every call starts again from page 1.
    pub fn listing_stream(&self, request: ListingRequest) -> BoxStream<'static, Result<String>> {
        self.traversal(request)
            .into_stream()
            .map_ok(|item| item.id)
            .boxed()
    }

    async fn ids(&self, request: ListingRequest) -> Result<Vec<String>> {
        Ok(self.listing(request).await?.into_ids())
    }

    /// Works by `username`, newest update first.
    pub async fn user_work_ids(&self, username: &str, options: ListingOptions) -> Result<Vec<String>> {
        let request = ListingRequest::new(urls::user_works(self.base_url(), username))
            .with_date_mode(DateMode::ByUpdateDate)
            .with_options(options);
        self.ids(request).await
    }

    /// Works gifted to `username`, newest update first.
    pub async fn user_gift_ids(&self, username: &str, options: ListingOptions) -> Result<Vec<String>> {
        let request = ListingRequest::new(urls::user_gifts(self.base_url(), username))
            .with_date_mode(DateMode::ByUpdateDate)
            .with_options(options);
        self.ids(request).await
    }

    /// Works bookmarked by `username`.
    ///
    /// Ordered by bookmark date, or by the works' update date when
    /// `sort_by_updated` is set; the cutoff follows the same date. With
    /// `expand_series`, bookmarked series contribute their works in place.
    /// Private bookmarks need a logged-in session.
    pub async fn user_bookmark_ids(
        &self,
        username: &str,
        options: ListingOptions,
        expand_series: bool,
        sort_by_updated: bool,
    ) -> Result<Vec<String>> {
        let date_mode = if sort_by_updated {
            DateMode::ByUpdateDate
        } else {
            DateMode::ByInteractionDate
        };
        let request =
            ListingRequest::new(urls::user_bookmarks(self.base_url(), username, sort_by_updated))
                .with_date_mode(date_mode)
                .with_expand_series(expand_series)
                .with_options(options);
        self.ids(request).await
    }

    /// Works `username` marked for later. Series are not expanded.
    pub async fn marked_for_later_ids(
        &self,
        username: &str,
        options: ListingOptions,
    ) -> Result<Vec<String>> {
        let request = ListingRequest::new(urls::marked_for_later(self.base_url(), username))
            .with_date_mode(DateMode::ByInteractionDate)
            .with_options(options);
        self.ids(request).await
    }

    /// Reading history with last-visit dates, most recent first.
    ///
    /// Requires a logged-in session and the history feature enabled on the
    /// account.
    pub async fn reading_history(
        &self,
        username: &str,
        options: ListingOptions,
    ) -> Result<Vec<ListedItem>> {
        let request = ListingRequest::new(urls::reading_history(self.base_url(), username))
            .with_date_mode(DateMode::ByInteractionDate)
            .with_options(options);
        Ok(self.listing(request).await?.items)
    }

    async fn subscription_ids(
        &self,
        username: &str,
        kind: EntryKind,
        max_count: Option<usize>,
    ) -> Result<Vec<String>> {
        let mut request = ListingRequest::new(urls::subscriptions(self.base_url(), username, kind))
            .with_date_mode(DateMode::None)
            .with_target(kind);
        request.max_count = max_count;
        self.ids(request).await
    }

    /// Usernames `username` is subscribed to.
    pub async fn user_subscription_ids(
        &self,
        username: &str,
        max_count: Option<usize>,
    ) -> Result<Vec<String>> {
        self.subscription_ids(username, EntryKind::User, max_count).await
    }

    /// Series `username` is subscribed to.
    pub async fn series_subscription_ids(
        &self,
        username: &str,
        max_count: Option<usize>,
    ) -> Result<Vec<String>> {
        self.subscription_ids(username, EntryKind::Series, max_count).await
    }

    /// Works `username` is subscribed to.
    pub async fn work_subscription_ids(
        &self,
        username: &str,
        max_count: Option<usize>,
    ) -> Result<Vec<String>> {
        self.subscription_ids(username, EntryKind::Work, max_count).await
    }

    /// Works of a series in series order.
    pub async fn series_work_ids(&self, series_id: &str, options: ListingOptions) -> Result<Vec<String>> {
        let request =
            ListingRequest::series_members(self.base_url(), series_id).with_options(options);
        self.ids(request).await
    }

    /// Works in a collection, newest update first.
    pub async fn collection_work_ids(
        &self,
        collection_id: &str,
        options: ListingOptions,
    ) -> Result<Vec<String>> {
        let request = ListingRequest::new(urls::collection_works(self.base_url(), collection_id))
            .with_date_mode(DateMode::ByUpdateDate)
            .with_options(options);
        self.ids(request).await
    }

    /// Total works by `username`, read from the heading of their profile's
    /// works page. 0 when the heading carries no count.
    pub async fn user_works_count(&self, username: &str) -> Result<usize> {
        let url = urls::user_profile_works(self.base_url(), username);
        let page = self.fetcher.fetch(&url).await?;
        Ok(self.extractor.parse(&page.body).works_count())
    }
}
