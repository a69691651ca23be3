//! Listing requests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extract::{DateMode, EntryKind};
use crate::urls::{self, PageTemplate};

/// Result limits shared by every listing method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListingOptions {
    /// Maximum number of results; `None` or 0 is unbounded.
    #[serde(default)]
    pub max_count: Option<usize>,
    /// Stop at the first entry dated before this day.
    #[serde(default)]
    pub oldest_date: Option<NaiveDate>,
}

impl ListingOptions {
    /// No cap, no cutoff.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cap.
    #[must_use]
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Sets the cutoff.
    #[must_use]
    pub fn with_oldest_date(mut self, oldest_date: NaiveDate) -> Self {
        self.oldest_date = Some(oldest_date);
        self
    }
}

/// Everything one traversal needs to know. Built once per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRequest {
    /// Listing URL without its page number.
    pub template: PageTemplate,
    /// Which per-item date is read.
    pub date_mode: DateMode,
    /// Maximum number of results; `None` or 0 is unbounded.
    pub max_count: Option<usize>,
    /// Cutoff date; entries strictly older stop the walk.
    pub oldest_date: Option<NaiveDate>,
    /// Replace series entries with their works.
    pub expand_series: bool,
    /// The entry kind collected.
    pub target: EntryKind,
}

impl ListingRequest {
    /// A request for the works of `template`, dated by update, unbounded.
    #[must_use]
    pub fn new(template: PageTemplate) -> Self {
        Self {
            template,
            date_mode: DateMode::ByUpdateDate,
            max_count: None,
            oldest_date: None,
            expand_series: false,
            target: EntryKind::Work,
        }
    }

    /// The member listing of a series: every work, no limits, no expansion.
    #[must_use]
    pub fn series_members(base_url: &str, series_id: &str) -> Self {
        Self::new(urls::series_works(base_url, series_id))
    }

    /// Sets which per-item date is read.
    #[must_use]
    pub fn with_date_mode(mut self, date_mode: DateMode) -> Self {
        self.date_mode = date_mode;
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Stops at the first entry dated before `oldest_date`.
    #[must_use]
    pub fn with_oldest_date(mut self, oldest_date: NaiveDate) -> Self {
        self.oldest_date = Some(oldest_date);
        self
    }

    /// Turns series expansion on or off.
    #[must_use]
    pub fn with_expand_series(mut self, expand_series: bool) -> Self {
        self.expand_series = expand_series;
        self
    }

    /// Sets the entry kind collected.
    #[must_use]
    pub fn with_target(mut self, target: EntryKind) -> Self {
        self.target = target;
        self
    }

    /// Applies a cap and cutoff.
    #[must_use]
    pub fn with_options(mut self, options: ListingOptions) -> Self {
        self.max_count = options.max_count;
        self.oldest_date = options.oldest_date;
        self
    }

    /// The active cap. A zero cap means no cap.
    #[must_use]
    pub fn cap(&self) -> Option<usize> {
        self.max_count.filter(|&cap| cap > 0)
    }

    /// Whether an entry dated `date` falls past the cutoff.
    ///
    /// Undated entries never do. The boundary day itself is kept.
    #[must_use]
    pub fn is_past_cutoff(&self, date: Option<NaiveDate>) -> bool {
        match (self.oldest_date, date) {
            (Some(oldest), Some(date)) => date < oldest,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BASE_URL;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    #[test]
    fn test_defaults() {
        let request = ListingRequest::series_members(BASE_URL, "9");
        assert_eq!(request.template.page(1), "https://archiveofourown.org/series/9?page=1");
        assert_eq!(request.date_mode, DateMode::ByUpdateDate);
        assert_eq!(request.cap(), None);
        assert!(!request.expand_series);
        assert_eq!(request.target, EntryKind::Work);
    }

    #[test]
    fn test_zero_cap_is_unbounded() {
        let request = ListingRequest::new(PageTemplate::new("x")).with_max_count(0);
        assert_eq!(request.cap(), None);
        assert_eq!(request.with_max_count(3).cap(), Some(3));
    }

    #[test]
    fn test_cutoff_is_strict() {
        let request = ListingRequest::new(PageTemplate::new("x")).with_oldest_date(day(10));
        assert!(request.is_past_cutoff(Some(day(9))));
        assert!(!request.is_past_cutoff(Some(day(10))));
        assert!(!request.is_past_cutoff(Some(day(11))));
        assert!(!request.is_past_cutoff(None));

        let unbounded = ListingRequest::new(PageTemplate::new("x"));
        assert!(!unbounded.is_past_cutoff(Some(day(1))));
    }

    #[test]
    fn test_with_options() {
        let options = ListingOptions::new().with_max_count(5).with_oldest_date(day(2));
        let request = ListingRequest::new(PageTemplate::new("x")).with_options(options);
        assert_eq!(request.max_count, Some(5));
        assert_eq!(request.oldest_date, Some(day(2)));
    }

    #[test]
    fn test_options_from_json() {
        let options: ListingOptions =
            serde_json::from_str(r#"{"oldest_date": "2021-01-03"}"#).unwrap();
        assert_eq!(options.max_count, None);
        assert_eq!(options.oldest_date, Some(day(3)));
    }
}
