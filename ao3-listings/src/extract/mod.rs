//! Record extraction from archive listing pages.
//!
//! This module provides:
//! - Typed entries (work, series, user) with optional dates
//! - Page flavor detection (bookmarks, reading history, generic index,
//!   subscriptions)
//! - Deleted/locked item detection
//! - Pagination-control detection

mod markup;
mod models;
mod page;

pub use markup::ARCHIVE_DATE_FORMAT;
pub use models::{AnomalyKind, DateMode, Entry, EntryKind, ListItem, PageFlavor};
pub use page::{ListingPage, PageScan, RecordExtractor};
