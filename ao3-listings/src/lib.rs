//! # ao3-listings
//!
//! Paginated listing traversal for the Archive of Our Own.
//!
//! The archive has no API; its listings (a user's works, bookmarks, gifts,
//! reading history, subscriptions, series and collections) are HTML pages
//! of twenty items each. This crate walks them with support for:
//!
//! - **Typed extraction**: works, series and users, dated by update or by
//!   the user's own bookmark/visit
//! - **Early termination**: a date cutoff and a result cap
//! - **Series expansion**: bookmarked series replaced by their works
//! - **Polite fetching**: a fixed delay per request and unbounded retries on
//!   the archive's overload and rate-limit responses
//! - **Cancellation**: a shared token raced against every wait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ao3_listings::prelude::*;
//!
//! let archive = Archive::new(ArchiveConfig::default())?;
//!
//! let options = ListingOptions::new().with_max_count(100);
//! let ids = archive
//!     .user_bookmark_ids("someone", options, true, false)
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod archive;
pub mod cancellation;
pub mod config;
pub mod errors;
pub mod extract;
pub mod fetcher;
pub mod observability;
pub mod session;
pub mod testing;
pub mod traversal;
pub mod urls;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::archive::Archive;
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{ArchiveConfig, RetryPolicy, SessionConfig};
    pub use crate::errors::{ArchiveError, Result};
    pub use crate::extract::{DateMode, Entry, EntryKind, RecordExtractor};
    pub use crate::observability::{
        init_logging, LogFormat, LoggingTraversalObserver, NoOpTraversalObserver,
        TraversalObserver,
    };
    pub use crate::session::{HttpSession, Session};
    pub use crate::traversal::{
        ListedItem, ListingOptions, ListingOutcome, ListingRequest, StopReason, Traversal,
    };
    pub use crate::urls::{work_id_from_url, PageTemplate};
}
