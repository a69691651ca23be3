//! Listing page fixtures.
//!
//! Renders just enough of the archive's listing markup for the extractor:
//! the listing container, blurbs with their header and user blocks, and the
//! pagination control.

use std::fmt::Write as _;

/// State of the "next" pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NextControl {
    /// `<li class="next">` with a link.
    Enabled,
    /// `<li class="next">` wrapping a disabled span.
    Disabled,
    /// No pagination control at all.
    #[default]
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Works,
    Bookmarks,
    Reading,
    Subscriptions,
}

impl Container {
    const fn open_tag(self) -> &'static str {
        match self {
            Self::Works => r#"<ol class="work index group">"#,
            Self::Bookmarks => r#"<ol class="bookmark index group">"#,
            Self::Reading => r#"<ol class="reading work index group">"#,
            Self::Subscriptions => r#"<dl class="subscription index group">"#,
        }
    }

    const fn close_tag(self) -> &'static str {
        match self {
            Self::Subscriptions => "</dl>",
            _ => "</ol>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BlurbShape {
    Linked { href: String, li_id: Option<String> },
    Deleted,
    Locked,
    Broken { li_id: String },
}

/// One `li.blurb` of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blurb {
    shape: BlurbShape,
    updated: Option<String>,
    bookmarked: Option<String>,
    visited: Option<String>,
}

impl Blurb {
    fn linked(href: String, li_id: Option<String>) -> Self {
        Self {
            shape: BlurbShape::Linked { href, li_id },
            updated: None,
            bookmarked: None,
            visited: None,
        }
    }

    /// A work blurb linking to `/works/{id}`.
    #[must_use]
    pub fn work(id: &str) -> Self {
        Self::linked(format!("/works/{id}"), Some(format!("work_{id}")))
    }

    /// A series blurb linking to `/series/{id}`.
    #[must_use]
    pub fn series(id: &str) -> Self {
        Self::linked(format!("/series/{id}"), Some(format!("series_{id}")))
    }

    /// A blurb whose heading links to an arbitrary target.
    #[must_use]
    pub fn with_href(href: &str) -> Self {
        Self::linked(href.to_string(), None)
    }

    /// A deleted item.
    #[must_use]
    pub fn deleted() -> Self {
        Self {
            shape: BlurbShape::Deleted,
            updated: None,
            bookmarked: None,
            visited: None,
        }
    }

    /// A restricted item shown with a mystery header.
    #[must_use]
    pub fn locked() -> Self {
        Self {
            shape: BlurbShape::Locked,
            ..Self::deleted()
        }
    }

    /// An item with no heading and no anomaly marker.
    #[must_use]
    pub fn broken(li_id: &str) -> Self {
        Self {
            shape: BlurbShape::Broken {
                li_id: li_id.to_string(),
            },
            ..Self::deleted()
        }
    }

    /// Sets the header date.
    #[must_use]
    pub fn updated(mut self, date: &str) -> Self {
        self.updated = Some(date.to_string());
        self
    }

    /// Sets the bookmark date in the user block.
    #[must_use]
    pub fn bookmarked(mut self, date: &str) -> Self {
        self.bookmarked = Some(date.to_string());
        self
    }

    /// Sets the "Last visited" line in the user block.
    #[must_use]
    pub fn visited(mut self, date: &str) -> Self {
        self.visited = Some(date.to_string());
        self
    }

    fn render(&self, out: &mut String) {
        match &self.shape {
            BlurbShape::Deleted => {
                out.push_str(
                    r#"<li class="deleted blurb group" role="article"><p class="message">This has been deleted, sorry!</p></li>"#,
                );
            }
            BlurbShape::Locked => {
                out.push_str(concat!(
                    r#"<li class="work blurb group" role="article">"#,
                    r#"<div class="mystery header picture module">"#,
                    r#"<h4 class="heading">Mystery Work</h4>"#,
                    r#"<p class="message">This work is only available to registered users of the Archive.</p>"#,
                    "</div></li>"
                ));
            }
            BlurbShape::Broken { li_id } => {
                let _ = write!(
                    out,
                    r#"<li id="{li_id}" class="work blurb group" role="article"><div class="header module"><p class="message">Unavailable</p></div></li>"#
                );
            }
            BlurbShape::Linked { href, li_id } => {
                match li_id {
                    Some(id) => {
                        let _ = write!(out, r#"<li id="{id}" class="blurb group" role="article">"#);
                    }
                    None => out.push_str(r#"<li class="blurb group" role="article">"#),
                }
                let _ = write!(
                    out,
                    concat!(
                        r#"<div class="header module">"#,
                        r#"<h4 class="heading"><a href="{href}">A Title</a> by "#,
                        r#"<a rel="author" href="/users/author/pseuds/author">author</a></h4>"#
                    ),
                    href = href
                );
                if let Some(date) = &self.updated {
                    let _ = write!(out, r#"<p class="datetime">{date}</p>"#);
                }
                out.push_str("</div>");
                out.push_str(r#"<blockquote class="userstuff summary"><p>Summary.</p></blockquote>"#);

                if self.bookmarked.is_some() || self.visited.is_some() {
                    out.push_str(r#"<div class="user module group">"#);
                    if let Some(date) = &self.bookmarked {
                        let _ = write!(out, r#"<p class="datetime">{date}</p>"#);
                    }
                    if let Some(date) = &self.visited {
                        let _ = write!(
                            out,
                            r#"<h4 class="viewed heading"><span>Last visited:</span> {date} (Latest version.) Visited once</h4>"#
                        );
                    }
                    out.push_str("</div>");
                }
                out.push_str("</li>");
            }
        }
    }
}

/// Builder for a whole listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingHtml {
    container: Container,
    heading: Option<String>,
    items: Vec<String>,
    next: NextControl,
}

impl ListingHtml {
    fn new(container: Container) -> Self {
        Self {
            container,
            heading: None,
            items: Vec::new(),
            next: NextControl::Absent,
        }
    }

    /// A generic works index.
    #[must_use]
    pub fn works() -> Self {
        Self::new(Container::Works)
    }

    /// A bookmark listing.
    #[must_use]
    pub fn bookmarks() -> Self {
        Self::new(Container::Bookmarks)
    }

    /// A reading history listing.
    #[must_use]
    pub fn reading() -> Self {
        Self::new(Container::Reading)
    }

    /// A subscription listing.
    #[must_use]
    pub fn subscriptions() -> Self {
        Self::new(Container::Subscriptions)
    }

    /// Sets the page `h2`.
    #[must_use]
    pub fn heading(mut self, text: &str) -> Self {
        self.heading = Some(text.to_string());
        self
    }

    /// Appends a blurb.
    #[must_use]
    pub fn blurb(mut self, blurb: Blurb) -> Self {
        let mut rendered = String::new();
        blurb.render(&mut rendered);
        self.items.push(rendered);
        self
    }

    /// Appends one work blurb per id, with no dates.
    #[must_use]
    pub fn works_with_ids(self, ids: &[&str]) -> Self {
        ids.iter().fold(self, |page, id| page.blurb(Blurb::work(id)))
    }

    /// Appends a subscription entry linking to `href`.
    #[must_use]
    pub fn subscription(mut self, href: &str) -> Self {
        self.items.push(format!(
            r#"<dt><a href="{href}">Subscribed thing</a> (Thing)</dt><dd><form><input type="submit" value="Unsubscribe"></form></dd>"#
        ));
        self
    }

    /// Sets the pagination control.
    #[must_use]
    pub fn next(mut self, next: NextControl) -> Self {
        self.next = next;
        self
    }

    /// Renders the page.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from(
            r#"<!DOCTYPE html><html><head><title>Archive of Our Own</title></head><body><div id="main">"#,
        );
        if let Some(heading) = &self.heading {
            let _ = write!(out, r#"<h2 class="heading">{heading}</h2>"#);
        }
        out.push_str(self.container.open_tag());
        for item in &self.items {
            out.push_str(item);
        }
        out.push_str(self.container.close_tag());

        match self.next {
            NextControl::Enabled => out.push_str(
                r#"<ol class="pagination actions" role="navigation"><li class="next" title="next"><a rel="next" href="?page=2">Next</a></li></ol>"#,
            ),
            NextControl::Disabled => out.push_str(
                r#"<ol class="pagination actions" role="navigation"><li class="next" title="next"><span class="disabled">Next</span></li></ol>"#,
            ),
            NextControl::Absent => {}
        }
        out.push_str("</div></body></html>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_container_and_items() {
        let html = ListingHtml::bookmarks()
            .blurb(Blurb::work("1").bookmarked("01 Jan 2020"))
            .next(NextControl::Disabled)
            .render();

        assert!(html.contains(r#"<ol class="bookmark index group">"#));
        assert!(html.contains(r#"href="/works/1""#));
        assert!(html.contains(r#"<span class="disabled">"#));
    }

    #[test]
    fn test_subscription_render() {
        let html = ListingHtml::subscriptions().subscription("/users/x").render();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<dl class="subscription index group"><dt><a href="/users/x">"#));
    }
}
