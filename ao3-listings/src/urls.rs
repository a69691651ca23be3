//! URL construction for archive listings.
//!
//! Listing URLs are built without a page number; [`PageTemplate::page`]
//! adds it. Every builder takes the archive root so tests and mirrors can
//! point elsewhere.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{ArchiveError, Result};
use crate::extract::EntryKind;

/// A listing URL without its page parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTemplate {
    base: String,
}

impl PageTemplate {
    /// Wraps a listing URL. Any `page` query parameter it carries is
    /// replaced when pages are generated.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { base: url.into() }
    }

    /// The URL as given.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Adds a query parameter to the template.
    #[must_use]
    pub fn with_query(self, key: &str, value: &str) -> Self {
        let separator = if self.base.contains('?') { '&' } else { '?' };
        Self {
            base: format!("{}{separator}{key}={value}", self.base),
        }
    }

    /// The URL of page `page_no` (1-based).
    ///
    /// `page=N` becomes the sole query parameter, or is appended to the
    /// existing query.
    #[must_use]
    pub fn page(&self, page_no: usize) -> String {
        let (path, fragment) = match self.base.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (self.base.as_str(), None),
        };

        let mut url = match path.split_once('?') {
            None => format!("{path}?page={page_no}"),
            Some((path, query)) => {
                let mut params: Vec<&str> = query
                    .split('&')
                    .filter(|param| !param.is_empty() && *param != "page" && !param.starts_with("page="))
                    .collect();
                let page_param = format!("page={page_no}");
                params.push(&page_param);
                format!("{path}?{}", params.join("&"))
            }
        };

        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }
}

impl std::fmt::Display for PageTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}

/// URL of a work.
#[must_use]
pub fn work_url(base_url: &str, work_id: &str) -> String {
    format!("{base_url}/works/{work_id}")
}

/// URL of a series.
#[must_use]
pub fn series_url(base_url: &str, series_id: &str) -> String {
    format!("{base_url}/series/{series_id}")
}

/// URL of a user's profile.
#[must_use]
pub fn user_url(base_url: &str, username: &str) -> String {
    format!("{base_url}/users/{username}")
}

/// URL of a collection.
#[must_use]
pub fn collection_url(base_url: &str, collection_id: &str) -> String {
    format!("{base_url}/collections/{collection_id}")
}

/// The works page of a user's profile, unpaginated.
#[must_use]
pub fn user_profile_works(base_url: &str, username: &str) -> String {
    format!("{}/works", user_url(base_url, username))
}

/// All works by a user, across pseuds.
#[must_use]
pub fn user_works(base_url: &str, username: &str) -> PageTemplate {
    PageTemplate::new(format!("{base_url}/works")).with_query("user_id", username)
}

/// Works gifted to a user.
#[must_use]
pub fn user_gifts(base_url: &str, username: &str) -> PageTemplate {
    PageTemplate::new(format!("{}/gifts", user_url(base_url, username)))
}

/// A user's bookmarks, by bookmark date or by the works' update date.
#[must_use]
pub fn user_bookmarks(base_url: &str, username: &str, sort_by_updated: bool) -> PageTemplate {
    let template = PageTemplate::new(format!("{}/bookmarks", user_url(base_url, username)));
    if sort_by_updated {
        template.with_query("bookmark_search[sort_column]", "bookmarkable_date")
    } else {
        template
    }
}

/// A user's marked-for-later list.
#[must_use]
pub fn marked_for_later(base_url: &str, username: &str) -> PageTemplate {
    PageTemplate::new(format!("{}/readings", user_url(base_url, username)))
        .with_query("show", "to-read")
}

/// A user's reading history.
#[must_use]
pub fn reading_history(base_url: &str, username: &str) -> PageTemplate {
    PageTemplate::new(format!("{}/readings", user_url(base_url, username)))
}

/// A user's subscriptions of one kind.
#[must_use]
pub fn subscriptions(base_url: &str, username: &str, kind: EntryKind) -> PageTemplate {
    PageTemplate::new(format!("{}/subscriptions", user_url(base_url, username)))
        .with_query("type", kind.path_segment())
}

/// Works in a series.
#[must_use]
pub fn series_works(base_url: &str, series_id: &str) -> PageTemplate {
    PageTemplate::new(series_url(base_url, series_id))
}

/// Works in a collection.
#[must_use]
pub fn collection_works(base_url: &str, collection_id: &str) -> PageTemplate {
    PageTemplate::new(format!("{}/works", collection_url(base_url, collection_id)))
}

/// Extracts the work id from a work URL.
///
/// Accepts `http` and `https`, with or without a trailing path
/// (`/chapters/...`) or query.
pub fn work_id_from_url(url: &str) -> Result<String> {
    let pattern = Regex::new(r"^https?://archiveofourown\.org/works/(?P<work_id>[0-9]+)")?;
    pattern
        .captures(url)
        .map(|caps| caps["work_id"].to_string())
        .ok_or_else(|| ArchiveError::BadInput {
            input: url.to_string(),
            expected: "AO3 work URL",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BASE_URL;

    #[test]
    fn test_page_without_query() {
        let template = series_works(BASE_URL, "123");
        assert_eq!(template.page(1), "https://archiveofourown.org/series/123?page=1");
        assert_eq!(template.page(7), "https://archiveofourown.org/series/123?page=7");
    }

    #[test]
    fn test_page_with_query() {
        let template = user_works(BASE_URL, "someone");
        assert_eq!(
            template.page(2),
            "https://archiveofourown.org/works?user_id=someone&page=2"
        );
    }

    #[test]
    fn test_page_replaces_existing_page_param() {
        let template = PageTemplate::new("https://archiveofourown.org/users/a/bookmarks?page=9&x=1");
        assert_eq!(
            template.page(3),
            "https://archiveofourown.org/users/a/bookmarks?x=1&page=3"
        );
    }

    #[test]
    fn test_page_keeps_fragment() {
        let template = PageTemplate::new("https://archiveofourown.org/works?tag=x#main");
        assert_eq!(template.page(1), "https://archiveofourown.org/works?tag=x&page=1#main");
    }

    #[test]
    fn test_listing_templates() {
        assert_eq!(
            user_gifts(BASE_URL, "u").page(1),
            "https://archiveofourown.org/users/u/gifts?page=1"
        );
        assert_eq!(
            user_bookmarks(BASE_URL, "u", false).page(1),
            "https://archiveofourown.org/users/u/bookmarks?page=1"
        );
        assert_eq!(
            user_bookmarks(BASE_URL, "u", true).page(2),
            "https://archiveofourown.org/users/u/bookmarks?bookmark_search[sort_column]=bookmarkable_date&page=2"
        );
        assert_eq!(
            marked_for_later(BASE_URL, "u").page(1),
            "https://archiveofourown.org/users/u/readings?show=to-read&page=1"
        );
        assert_eq!(
            reading_history(BASE_URL, "u").page(4),
            "https://archiveofourown.org/users/u/readings?page=4"
        );
        assert_eq!(
            subscriptions(BASE_URL, "u", EntryKind::Series).page(1),
            "https://archiveofourown.org/users/u/subscriptions?type=series&page=1"
        );
        assert_eq!(
            collection_works(BASE_URL, "fest").page(1),
            "https://archiveofourown.org/collections/fest/works?page=1"
        );
    }

    #[test]
    fn test_entity_urls() {
        assert_eq!(work_url(BASE_URL, "1"), "https://archiveofourown.org/works/1");
        assert_eq!(series_url(BASE_URL, "2"), "https://archiveofourown.org/series/2");
        assert_eq!(user_url(BASE_URL, "u"), "https://archiveofourown.org/users/u");
        assert_eq!(
            user_profile_works(BASE_URL, "u"),
            "https://archiveofourown.org/users/u/works"
        );
        assert_eq!(
            collection_url(BASE_URL, "c"),
            "https://archiveofourown.org/collections/c"
        );
    }

    #[test]
    fn test_work_id_from_url() {
        assert_eq!(
            work_id_from_url("https://archiveofourown.org/works/1234567").unwrap(),
            "1234567"
        );
        assert_eq!(
            work_id_from_url("http://archiveofourown.org/works/42/chapters/7").unwrap(),
            "42"
        );
    }

    #[test]
    fn test_work_id_from_bad_url() {
        let err = work_id_from_url("https://example.org/works/1").unwrap_err();
        match err {
            ArchiveError::BadInput { input, .. } => assert_eq!(input, "https://example.org/works/1"),
            other => panic!("expected bad input, got {other:?}"),
        }
    }
}
