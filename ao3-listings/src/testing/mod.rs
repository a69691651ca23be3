//! Testing utilities for code that drives listing traversals.
//!
//! This module provides:
//! - Listing page fixtures (blurbs, anomalies, pagination states)
//! - A scripted session keyed by URL, with a request log
//! - Capture of `tracing` output

mod html;
mod logs;
mod session;

pub use html::{Blurb, ListingHtml, NextControl};
pub use logs::LogCapture;
pub use session::ScriptedSession;
