//! Paginated listing traversal.
//!
//! This module provides:
//! - [`ListingRequest`] describing one walk (template, date mode, cap,
//!   cutoff, series expansion)
//! - [`Traversal`], the page-by-page driver, usable incrementally, to
//!   completion, or as a stream
//! - Series expansion through a nested traversal
//! - [`ListingOutcome`] with the stop reason and anomaly tally

mod driver;
mod outcome;
mod request;
mod series;


pub use driver::Traversal;
pub use outcome::{ListedItem, ListingOutcome, PageReport, StopReason};
pub use request::{ListingOptions, ListingRequest};
