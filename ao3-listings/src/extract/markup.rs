//! Compiled selectors and patterns for archive listing markup.

use regex::Regex;
use scraper::Selector;

use crate::errors::{ArchiveError, Result};

/// Date format used everywhere on the archive, e.g. `05 Jan 2021`.
pub const ARCHIVE_DATE_FORMAT: &str = "%d %b %Y";

/// Listing containers in lookup order. The first one present on a page is
/// the listing.
pub(crate) const CONTAINER_CANDIDATES: [&str; 3] = ["ol.index", "ul.index", "dl.subscription"];

/// Everything the extractor looks up, compiled once.
#[derive(Debug)]
pub(crate) struct Markup {
    pub containers: Vec<Selector>,
    pub blurb: Selector,
    pub subscription_item: Selector,
    pub heading: Selector,
    pub link: Selector,
    pub header_date: Selector,
    pub user_block: Selector,
    pub datetime: Selector,
    pub viewed: Selector,
    pub mystery: Selector,
    pub next_button: Selector,
    pub disabled: Selector,
    pub page_heading: Selector,
    pub last_visited: Regex,
    pub works_count: Regex,
}

impl Markup {
    pub fn compile() -> Result<Self> {
        Ok(Self {
            containers: CONTAINER_CANDIDATES
                .iter()
                .map(|css| selector(css))
                .collect::<Result<_>>()?,
            blurb: selector("li.blurb")?,
            subscription_item: selector("dt")?,
            heading: selector("h4.heading")?,
            link: selector("a")?,
            header_date: selector("div.header p.datetime")?,
            user_block: selector("div.user")?,
            datetime: selector("p.datetime")?,
            viewed: selector("h4.viewed")?,
            mystery: selector("div.mystery")?,
            next_button: selector("li.next")?,
            disabled: selector("span.disabled")?,
            page_heading: selector("h2")?,
            last_visited: Regex::new(
                r"Last (?:visited|viewed):\s*([0-9]{1,2} [A-Za-z]{3} [0-9]{4})",
            )?,
            works_count: Regex::new(r" ([0-9][0-9,]*) Works?")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ArchiveError::Selector(format!("{css}: {e}")))
}
