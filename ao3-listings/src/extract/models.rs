//! Typed records extracted from listing pages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which per-item date a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMode {
    /// The work's publish/update date.
    #[default]
    ByUpdateDate,
    /// When the user bookmarked or last visited the work.
    ByInteractionDate,
    /// Items carry no date.
    None,
}

/// Markup variant of a listing page, resolved once per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFlavor {
    /// `<ol class="bookmark index group">`.
    BookmarkList,
    /// `<ol class="reading work index group">`.
    ReadingHistoryList,
    /// Any other `index` list: user works, series, collections, gifts.
    GenericIndexList,
    /// `<dl class="subscription index group">`.
    SubscriptionList,
}

/// Kind of entity a list entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A standalone work.
    Work,
    /// A series of works.
    Series,
    /// A user (subscription lists only).
    User,
}

impl EntryKind {
    /// The URL path segment for this kind.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Work => "works",
            Self::Series => "series",
            Self::User => "users",
        }
    }
}

/// One classified row of a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    /// A work.
    Work {
        /// Work identifier.
        id: String,
        /// Date under the active [`DateMode`].
        date: Option<NaiveDate>,
    },
    /// A series.
    Series {
        /// Series identifier.
        id: String,
        /// Date under the active [`DateMode`].
        date: Option<NaiveDate>,
    },
    /// A user; only produced by subscription lists.
    User {
        /// Username.
        id: String,
    },
}

impl Entry {
    /// Creates an entry of `kind`.
    #[must_use]
    pub fn new(kind: EntryKind, id: impl Into<String>, date: Option<NaiveDate>) -> Self {
        let id = id.into();
        match kind {
            EntryKind::Work => Self::Work { id, date },
            EntryKind::Series => Self::Series { id, date },
            EntryKind::User => Self::User { id },
        }
    }

    /// The entry's kind.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::Work { .. } => EntryKind::Work,
            Self::Series { .. } => EntryKind::Series,
            Self::User { .. } => EntryKind::User,
        }
    }

    /// The opaque identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Work { id, .. } | Self::Series { id, .. } | Self::User { id } => id,
        }
    }

    /// The associated date, if the page carried one.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Work { date, .. } | Self::Series { date, .. } => *date,
            Self::User { .. } => None,
        }
    }
}

/// Why a list item could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// `<li class="deleted ... blurb">`.
    Deleted,
    /// Restricted work shown with a `mystery` header.
    Locked,
}

/// One item of a listing, readable or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    /// A readable entry.
    Entry(Entry),
    /// A deleted or locked item; carries no identifier.
    Anomaly(AnomalyKind),
}
