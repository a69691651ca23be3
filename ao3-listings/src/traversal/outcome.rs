//! Traversal results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extract::{Entry, EntryKind};

/// Why a traversal stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// An entry older than the cutoff was reached.
    Cutoff,
    /// The result cap was reached.
    Cap,
    /// The last page had no enabled "next" control.
    NoNextPage,
}

/// One collected result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedItem {
    /// Opaque identifier.
    pub id: String,
    /// Kind of the identified entity.
    pub kind: EntryKind,
    /// Date under the request's date mode, if the page carried one. Works
    /// from an expanded series carry the date of the series entry.
    pub date: Option<NaiveDate>,
}

impl From<Entry> for ListedItem {
    fn from(entry: Entry) -> Self {
        let kind = entry.kind();
        let date = entry.date();
        let id = match entry {
            Entry::Work { id, .. } | Entry::Series { id, .. } | Entry::User { id } => id,
        };
        Self { id, kind, date }
    }
}

/// What one call to [`Traversal::next_page`](super::Traversal::next_page)
/// did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    /// 1-based page number of the outer listing.
    pub page_no: usize,
    /// The fetched URL.
    pub url: String,
    /// Items this page added, in order, after any truncation.
    pub items: Vec<ListedItem>,
    /// Deleted or locked items met on this page, series pages included.
    pub anomalies: usize,
    /// Set when this page ended the traversal.
    pub stop: Option<StopReason>,
}

/// Result of a completed traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingOutcome {
    /// Collected items in presentation order.
    pub items: Vec<ListedItem>,
    /// Deleted or locked items skipped.
    pub anomalies: usize,
    /// Pages fetched, series pages included.
    pub pages_fetched: usize,
    /// Why the traversal stopped.
    pub stop: StopReason,
}

impl ListingOutcome {
    /// Identifiers in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }

    /// Consumes the outcome, keeping only identifiers.
    #[must_use]
    pub fn into_ids(self) -> Vec<String> {
        self.items.into_iter().map(|item| item.id).collect()
    }

    /// Number of collected items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
