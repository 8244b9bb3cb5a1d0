use crate::site::extract::{comic_image_attr, link_by_rel, resolve_href};
use crate::site::{default_is_last_page, PageContent, SiteAdapter};
use crate::state::PageRecord;

/// First strip; the archive has no numbered URLs to guess from
const FIRST_PAGE_URL: &str = "pbfcomics.com/comics/stiff-breeze";

/// Page 6 links off-site, so page 7 has to be reached directly
const PAGE_SEVEN_URL: &str = "https://pbfcomics.com/comics/instant-bacon-2/";

/// pbfcomics.com: pages linked by `rel="next"`, slugs instead of numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct Pbf;

impl SiteAdapter for Pbf {
    fn base_identity(&self) -> &str {
        "pbfcomics.com"
    }

    fn next_link_of(&self, page: PageContent<'_>, number: u32) -> Option<String> {
        let next =
            link_by_rel(page.document, "next").and_then(|href| resolve_href(href, page.url));
        if next.is_none() {
            tracing::debug!("pbf page {} has no next link", number);
        }
        next
    }

    fn image_url_of(&self, page: PageContent<'_>, _number: u32) -> Option<String> {
        comic_image_attr(page.document, "src")
    }

    fn title_of(&self, page: PageContent<'_>, _number: u32) -> Option<String> {
        comic_image_attr(page.document, "title")
    }

    fn guessed_urls(&self, number: u32) -> Vec<String> {
        match number {
            1 => vec![FIRST_PAGE_URL.to_string()],
            7 => vec![PAGE_SEVEN_URL.to_string()],
            _ => Vec::new(),
        }
    }

    fn is_last_page(&self, record: &PageRecord) -> bool {
        record.number != 6 && default_is_last_page(record)
    }
}
