//! Record extraction from one rendered listing page.

use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use std::sync::Arc;

use super::markup::{Markup, ARCHIVE_DATE_FORMAT};
use super::models::{AnomalyKind, DateMode, Entry, EntryKind, ListItem, PageFlavor};
use crate::errors::{ArchiveError, Result};

/// Parses listing pages. Cheap to clone; the markup table is shared.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    markup: Arc<Markup>,
}

impl RecordExtractor {
    /// Compiles the markup table.
    pub fn new() -> Result<Self> {
        Ok(Self {
            markup: Arc::new(Markup::compile()?),
        })
    }

    /// Parses a page body.
    #[must_use]
    pub fn parse(&self, body: &str) -> ListingPage {
        ListingPage {
            document: Html::parse_document(body),
            markup: Arc::clone(&self.markup),
        }
    }

    /// Parses a page and reads its items up to and including the first
    /// malformed one.
    ///
    /// The parsed document is dropped before returning, so the scan can be
    /// held across `.await` points.
    #[must_use]
    pub fn scan(&self, body: &str, mode: DateMode) -> PageScan {
        let page = self.parse(body);
        let mut items = Vec::new();
        let mut malformed = None;

        for item in page.entries(mode) {
            match item {
                Ok(item) => items.push(item),
                Err(e) => {
                    malformed = Some(e);
                    break;
                }
            }
        }

        PageScan {
            flavor: page.flavor(),
            items,
            malformed,
            has_next_page: page.has_next_page(),
        }
    }
}

/// Owned result of reading one page.
#[derive(Debug)]
pub struct PageScan {
    /// Flavor of the listing container, `None` if the page had none.
    pub flavor: Option<PageFlavor>,
    /// Items in document order, up to the first malformed one.
    pub items: Vec<ListItem>,
    /// The error raised by the first malformed item, if any.
    ///
    /// It only matters if the traversal reaches that position; a cutoff or
    /// cap earlier on the page makes it irrelevant.
    pub malformed: Option<ArchiveError>,
    /// Whether the page offers an enabled "next" control.
    pub has_next_page: bool,
}

impl PageScan {
    /// Readable entries, skipping anomalies.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.items.iter().filter_map(|item| match item {
            ListItem::Entry(entry) => Some(entry),
            ListItem::Anomaly(_) => None,
        })
    }

    /// Number of deleted or locked items.
    #[must_use]
    pub fn anomaly_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, ListItem::Anomaly(_)))
            .count()
    }
}

/// A parsed listing page.
pub struct ListingPage {
    document: Html,
    markup: Arc<Markup>,
}

impl ListingPage {
    fn container(&self) -> Option<(ElementRef<'_>, PageFlavor)> {
        self.markup.containers.iter().find_map(|sel| {
            let element = self.document.select(sel).next()?;
            Some((element, flavor_of(element)))
        })
    }

    /// Flavor of the listing on this page, if there is one.
    #[must_use]
    pub fn flavor(&self) -> Option<PageFlavor> {
        self.container().map(|(_, flavor)| flavor)
    }

    /// Lazily reads the items of the listing.
    ///
    /// A page without a listing container yields nothing.
    pub fn entries(&self, mode: DateMode) -> impl Iterator<Item = Result<ListItem>> + '_ {
        let (elements, flavor) = match self.container() {
            Some((container, flavor)) => {
                let item_selector = if flavor == PageFlavor::SubscriptionList {
                    &self.markup.subscription_item
                } else {
                    &self.markup.blurb
                };
                (container.select(item_selector).collect::<Vec<_>>(), flavor)
            }
            None => (Vec::new(), PageFlavor::GenericIndexList),
        };

        elements.into_iter().filter_map(move |element| {
            let item = if flavor == PageFlavor::SubscriptionList {
                self.read_subscription(element)
            } else {
                self.read_blurb(element, flavor, mode)
            };
            item.transpose()
        })
    }

    /// Whether the pagination control offers a next page.
    ///
    /// A missing control and a disabled one both mean "no".
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.document
            .select(&self.markup.next_button)
            .next()
            .is_some_and(|next| next.select(&self.markup.disabled).next().is_none())
    }

    /// Text of the first `h2`, whitespace-collapsed.
    #[must_use]
    pub fn heading_text(&self) -> Option<String> {
        self.document
            .select(&self.markup.page_heading)
            .next()
            .map(|h2| collapsed_text(&h2))
    }

    /// Total from a "1 - 20 of N Works" heading; 0 when absent. Thousands
    /// separators are accepted.
    #[must_use]
    pub fn works_count(&self) -> usize {
        self.heading_text()
            .and_then(|text| {
                let padded = format!(" {text}");
                self.markup
                    .works_count
                    .captures(&padded)
                    .and_then(|caps| caps[1].replace(',', "").parse().ok())
            })
            .unwrap_or(0)
    }

    fn read_blurb(
        &self,
        li: ElementRef<'_>,
        flavor: PageFlavor,
        mode: DateMode,
    ) -> Result<Option<ListItem>> {
        if let Some(kind) = self.anomaly_marker(li) {
            return Ok(Some(ListItem::Anomaly(kind)));
        }

        let item_id = li.value().id();
        let heading = li
            .select(&self.markup.heading)
            .next()
            .ok_or_else(|| ArchiveError::markup("list item has no heading", item_id))?;

        let mut target = None;
        for link in heading.select(&self.markup.link) {
            let href = link
                .value()
                .attr("href")
                .ok_or_else(|| ArchiveError::markup("heading link has no href", item_id))?;
            if let Some(found) = classify_href(href, false) {
                target = Some(found);
                break;
            }
        }

        // External-work bookmarks have neither a work nor a series link.
        let Some((kind, id)) = target else {
            return Ok(None);
        };

        let date = self.item_date(li, flavor, mode)?;
        Ok(Some(ListItem::Entry(Entry::new(kind, id, date))))
    }

    fn read_subscription(&self, dt: ElementRef<'_>) -> Result<Option<ListItem>> {
        let href = dt
            .select(&self.markup.link)
            .next()
            .and_then(|link| link.value().attr("href"))
            .ok_or_else(|| ArchiveError::markup("subscription has no link", None))?;

        Ok(classify_href(href, true).map(|(kind, id)| ListItem::Entry(Entry::new(kind, id, None))))
    }

    fn anomaly_marker(&self, li: ElementRef<'_>) -> Option<AnomalyKind> {
        if li.value().classes().any(|class| class == "deleted") {
            Some(AnomalyKind::Deleted)
        } else if li.select(&self.markup.mystery).next().is_some() {
            Some(AnomalyKind::Locked)
        } else {
            None
        }
    }

    fn item_date(
        &self,
        li: ElementRef<'_>,
        flavor: PageFlavor,
        mode: DateMode,
    ) -> Result<Option<NaiveDate>> {
        match mode {
            DateMode::None => Ok(None),
            DateMode::ByUpdateDate => li
                .select(&self.markup.header_date)
                .next()
                .map(|p| parse_date(&collapsed_text(&p), li))
                .transpose(),
            DateMode::ByInteractionDate => match flavor {
                PageFlavor::ReadingHistoryList => self.last_visited_date(li),
                PageFlavor::BookmarkList => self.bookmark_date(li),
                PageFlavor::GenericIndexList | PageFlavor::SubscriptionList => {
                    match self.bookmark_date(li)? {
                        Some(date) => Ok(Some(date)),
                        None => self.last_visited_date(li),
                    }
                }
            },
        }
    }

    fn bookmark_date(&self, li: ElementRef<'_>) -> Result<Option<NaiveDate>> {
        li.select(&self.markup.user_block)
            .find_map(|block| block.select(&self.markup.datetime).next())
            .map(|p| parse_date(&collapsed_text(&p), li))
            .transpose()
    }

    fn last_visited_date(&self, li: ElementRef<'_>) -> Result<Option<NaiveDate>> {
        for block in li.select(&self.markup.user_block) {
            for viewed in block.select(&self.markup.viewed) {
                let text = collapsed_text(&viewed);
                if let Some(caps) = self.markup.last_visited.captures(&text) {
                    return parse_date(&caps[1], li).map(Some);
                }
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for ListingPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingPage")
            .field("flavor", &self.flavor())
            .field("has_next_page", &self.has_next_page())
            .finish_non_exhaustive()
    }
}

fn flavor_of(container: ElementRef<'_>) -> PageFlavor {
    let element = container.value();
    if element.name() == "dl" {
        PageFlavor::SubscriptionList
    } else if element.classes().any(|class| class == "bookmark") {
        PageFlavor::BookmarkList
    } else if element.classes().any(|class| class == "reading") {
        PageFlavor::ReadingHistoryList
    } else {
        PageFlavor::GenericIndexList
    }
}

/// Maps a link target to the entry it references.
///
/// Work links may be nested under a collection (`/collections/x/works/N`),
/// so the last `/works/` wins. User links only count when `allow_users` is
/// set; in blurb headings they are author bylines.
fn classify_href(href: &str, allow_users: bool) -> Option<(EntryKind, String)> {
    if href.contains("external_works") {
        return None;
    }

    let (kind, rest) = if let Some(pos) = href.rfind("/works/") {
        (EntryKind::Work, &href[pos + "/works/".len()..])
    } else if let Some(pos) = href.find("/series/") {
        (EntryKind::Series, &href[pos + "/series/".len()..])
    } else if let Some(pos) = href.find("/users/").filter(|_| allow_users) {
        (EntryKind::User, &href[pos + "/users/".len()..])
    } else {
        return None;
    };

    let id = rest
        .split(|c| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();
    (!id.is_empty()).then(|| (kind, id.to_string()))
}

fn parse_date(text: &str, li: ElementRef<'_>) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), ARCHIVE_DATE_FORMAT).map_err(|e| {
        ArchiveError::markup(format!("unparsable date {text:?}: {e}"), li.value().id())
    })
}

fn collapsed_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Blurb, ListingHtml, NextControl};
    use pretty_assertions::assert_eq;

    fn extractor() -> RecordExtractor {
        RecordExtractor::new().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn ids(scan: &PageScan) -> Vec<&str> {
        scan.entries().map(Entry::id).collect()
    }

    #[test]
    fn test_generic_list_in_document_order() {
        let html = ListingHtml::works()
            .blurb(Blurb::work("101").updated("05 Jan 2021"))
            .blurb(Blurb::work("102").updated("04 Jan 2021"))
            .blurb(Blurb::work("103").updated("1 Jan 2021"))
            .render();

        let scan = extractor().scan(&html, DateMode::ByUpdateDate);

        assert_eq!(scan.flavor, Some(PageFlavor::GenericIndexList));
        assert_eq!(
            scan.items,
            vec![
                ListItem::Entry(Entry::new(EntryKind::Work, "101", date(2021, 1, 5))),
                ListItem::Entry(Entry::new(EntryKind::Work, "102", date(2021, 1, 4))),
                ListItem::Entry(Entry::new(EntryKind::Work, "103", date(2021, 1, 1))),
            ]
        );
        assert!(scan.malformed.is_none());
    }

    #[test]
    fn test_reextraction_is_identical() {
        let html = ListingHtml::bookmarks()
            .blurb(Blurb::work("1").bookmarked("02 Feb 2022"))
            .blurb(Blurb::series("9").bookmarked("01 Feb 2022"))
            .blurb(Blurb::deleted())
            .render();
        let extractor = extractor();

        let first = extractor.scan(&html, DateMode::ByInteractionDate);
        let second = extractor.scan(&html, DateMode::ByInteractionDate);
        assert_eq!(first.items, second.items);
    }

    #[test]
    fn test_date_mode_none_has_no_dates() {
        let html = ListingHtml::works()
            .blurb(Blurb::work("1").updated("05 Jan 2021"))
            .render();
        let scan = extractor().scan(&html, DateMode::None);
        assert_eq!(scan.entries().next().and_then(Entry::date), None);
    }

    #[test]
    fn test_bookmark_dates_by_interaction_and_update() {
        let html = ListingHtml::bookmarks()
            .blurb(
                Blurb::work("7")
                    .updated("10 Oct 2019")
                    .bookmarked("11 Nov 2020"),
            )
            .render();
        let extractor = extractor();

        let interaction = extractor.scan(&html, DateMode::ByInteractionDate);
        assert_eq!(interaction.flavor, Some(PageFlavor::BookmarkList));
        assert_eq!(interaction.entries().next().and_then(Entry::date), date(2020, 11, 11));

        let updated = extractor.scan(&html, DateMode::ByUpdateDate);
        assert_eq!(updated.entries().next().and_then(Entry::date), date(2019, 10, 10));
    }

    #[test]
    fn test_reading_history_last_visited() {
        let html = ListingHtml::reading()
            .blurb(Blurb::work("55").visited("24 Dec 2012"))
            .render();

        let scan = extractor().scan(&html, DateMode::ByInteractionDate);
        assert_eq!(scan.flavor, Some(PageFlavor::ReadingHistoryList));
        assert_eq!(
            scan.items,
            vec![ListItem::Entry(Entry::new(EntryKind::Work, "55", date(2012, 12, 24)))]
        );
    }

    #[test]
    fn test_generic_interaction_prefers_bookmark_date() {
        let html = ListingHtml::works()
            .blurb(
                Blurb::work("3")
                    .bookmarked("03 Mar 2023")
                    .visited("04 Apr 2024"),
            )
            .blurb(Blurb::work("4").visited("04 Apr 2024"))
            .render();

        let scan = extractor().scan(&html, DateMode::ByInteractionDate);
        let dates: Vec<_> = scan.entries().map(Entry::date).collect();
        assert_eq!(dates, vec![date(2023, 3, 3), date(2024, 4, 4)]);
    }

    #[test]
    fn test_series_and_collection_links() {
        let html = ListingHtml::bookmarks()
            .blurb(Blurb::series("77"))
            .blurb(Blurb::with_href("/collections/fest2020/works/88"))
            .render();

        let scan = extractor().scan(&html, DateMode::None);
        assert_eq!(
            scan.items,
            vec![
                ListItem::Entry(Entry::new(EntryKind::Series, "77", None)),
                ListItem::Entry(Entry::new(EntryKind::Work, "88", None)),
            ]
        );
    }

    #[test]
    fn test_external_work_bookmark_yields_nothing() {
        let html = ListingHtml::bookmarks()
            .blurb(Blurb::with_href("/external_works/12"))
            .blurb(Blurb::work("13"))
            .render();

        let scan = extractor().scan(&html, DateMode::None);
        assert_eq!(ids(&scan), vec!["13"]);
        assert_eq!(scan.anomaly_count(), 0);
    }

    #[test]
    fn test_deleted_and_locked_items_are_anomalies() {
        let html = ListingHtml::reading()
            .blurb(Blurb::work("1"))
            .blurb(Blurb::deleted())
            .blurb(Blurb::work("2"))
            .blurb(Blurb::locked())
            .blurb(Blurb::work("3"))
            .render();

        let scan = extractor().scan(&html, DateMode::ByInteractionDate);
        assert_eq!(ids(&scan), vec!["1", "2", "3"]);
        assert_eq!(scan.anomaly_count(), 2);
        assert!(scan.items.contains(&ListItem::Anomaly(AnomalyKind::Deleted)));
        assert!(scan.items.contains(&ListItem::Anomaly(AnomalyKind::Locked)));
        assert!(scan.malformed.is_none());
    }

    #[test]
    fn test_unmarked_broken_item_is_an_error() {
        let html = ListingHtml::works()
            .blurb(Blurb::work("1"))
            .blurb(Blurb::broken("work_2"))
            .blurb(Blurb::work("3"))
            .render();

        let scan = extractor().scan(&html, DateMode::ByUpdateDate);
        assert_eq!(ids(&scan), vec!["1"]);
        match scan.malformed {
            Some(ArchiveError::UnexpectedMarkup { item, .. }) => {
                assert_eq!(item.as_deref(), Some("work_2"));
            }
            other => panic!("expected markup error, got {other:?}"),
        }
    }

    #[test]
    fn test_unparsable_date_is_an_error() {
        let html = ListingHtml::works()
            .blurb(Blurb::work("1").updated("yesterday"))
            .render();

        let scan = extractor().scan(&html, DateMode::ByUpdateDate);
        assert!(scan.items.is_empty());
        assert!(matches!(
            scan.malformed,
            Some(ArchiveError::UnexpectedMarkup { .. })
        ));
    }

    #[test]
    fn test_page_without_container_is_empty() {
        let scan = extractor().scan("<html><body><p>Nothing here</p></body></html>", DateMode::None);
        assert_eq!(scan.flavor, None);
        assert!(scan.items.is_empty());
        assert!(!scan.has_next_page);
    }

    #[test]
    fn test_next_page_detection() {
        let extractor = extractor();
        let enabled = ListingHtml::works().next(NextControl::Enabled).render();
        let disabled = ListingHtml::works().next(NextControl::Disabled).render();
        let absent = ListingHtml::works().next(NextControl::Absent).render();

        assert!(extractor.parse(&enabled).has_next_page());
        assert!(!extractor.parse(&disabled).has_next_page());
        assert!(!extractor.parse(&absent).has_next_page());
    }

    #[test]
    fn test_subscription_list() {
        let html = ListingHtml::subscriptions()
            .subscription("/series/5")
            .subscription("/users/somebody")
            .subscription("/works/6")
            .render();

        let scan = extractor().scan(&html, DateMode::None);
        assert_eq!(scan.flavor, Some(PageFlavor::SubscriptionList));
        assert_eq!(
            scan.items,
            vec![
                ListItem::Entry(Entry::new(EntryKind::Series, "5", None)),
                ListItem::Entry(Entry::User { id: "somebody".to_string() }),
                ListItem::Entry(Entry::new(EntryKind::Work, "6", None)),
            ]
        );
    }

    #[test]
    fn test_works_count_heading() {
        let extractor = extractor();
        let page = extractor.parse("<html><body><h2>\n  1 - 20 of 38 Works by someone\n</h2></body></html>");
        assert_eq!(page.heading_text().as_deref(), Some("1 - 20 of 38 Works by someone"));
        assert_eq!(page.works_count(), 38);

        let large =
            extractor.parse("<html><body><h2>1 - 20 of 1,234 Works by someone</h2></body></html>");
        assert_eq!(large.works_count(), 1234);

        let single = extractor.parse("<html><body><h2>1 Work by someone</h2></body></html>");
        assert_eq!(single.works_count(), 1);

        let none = extractor.parse("<html><body><p>no heading</p></body></html>");
        assert_eq!(none.works_count(), 0);
    }

    #[test]
    fn test_classify_href() {
        assert_eq!(classify_href("/works/12", false), Some((EntryKind::Work, "12".to_string())));
        assert_eq!(
            classify_href("/works/12?view_adult=true", false),
            Some((EntryKind::Work, "12".to_string()))
        );
        assert_eq!(classify_href("/series/3", false), Some((EntryKind::Series, "3".to_string())));
        assert_eq!(classify_href("/users/a/pseuds/b", false), None);
        assert_eq!(classify_href("/users/a", true), Some((EntryKind::User, "a".to_string())));
        assert_eq!(classify_href("/external_works/9", false), None);
        assert_eq!(classify_href("/works/", false), None);
    }
}
