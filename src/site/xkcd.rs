use crate::site::extract::{comic_image_attr, link_by_text, resolve_href};
use crate::site::{PageContent, SiteAdapter};

/// xkcd.com: pages are numbered in the URL and linked by a "Next >" anchor
#[derive(Debug, Clone, Copy, Default)]
pub struct Xkcd;

impl SiteAdapter for Xkcd {
    fn base_identity(&self) -> &str {
        "xkcd.com"
    }

    fn next_link_of(&self, page: PageContent<'_>, number: u32) -> Option<String> {
        let next = link_by_text(page.document, "Next >")
            .and_then(|href| resolve_href(href, page.url));
        if next.is_none() {
            tracing::debug!("xkcd page {} has no next link", number);
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
        vec![format!("{}/{}", self.base_identity(), number)]
    }
}
