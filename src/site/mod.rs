//! Site adapters
//!
//! Every comic site lays out its pages differently. A [`SiteAdapter`] knows
//! how to find the next link, the strip image and its title on one site,
//! and how to guess a page URL from a page number when no link leads there.
//!
//! Two adapters ship with the crate:
//! - [`Xkcd`]: next link found by its anchor text
//! - [`Pbf`]: next link found by `rel="next"`, with a few hard-coded detours

pub mod extract;
mod pbf;
mod xkcd;

pub use pbf::Pbf;
pub use xkcd::Xkcd;

use crate::state::PageRecord;
use crate::WalkerError;
use scraper::Html;
use std::sync::Arc;
use url::Url;

/// A fetched page as seen by a site adapter
#[derive(Clone, Copy)]
pub struct PageContent<'a> {
    /// URL the page was fetched from, for resolving relative links
    pub url: &'a Url,

    /// Parsed HTML document
    pub document: &'a Html,
}

impl<'a> PageContent<'a> {
    pub fn new(url: &'a Url, document: &'a Html) -> Self {
        Self { url, document }
    }
}

/// Site-specific knowledge needed to walk one comic
pub trait SiteAdapter: Send + Sync {
    /// Stable identifier of the comic, used as cache key and directory name
    fn base_identity(&self) -> &str;

    /// Absolute URL of the page following this one
    fn next_link_of(&self, page: PageContent<'_>, number: u32) -> Option<String>;

    /// URL of the strip image, as written in the markup
    fn image_url_of(&self, page: PageContent<'_>, number: u32) -> Option<String>;

    /// Text used in the downloaded file name
    fn title_of(&self, page: PageContent<'_>, number: u32) -> Option<String>;

    /// URLs that may address the page when no stored link leads there
    fn guessed_urls(&self, number: u32) -> Vec<String>;

    /// Decides whether an unbounded walk stops after this page
    fn is_last_page(&self, record: &PageRecord) -> bool {
        default_is_last_page(record)
    }
}

/// The default last-page rule: a page without a next link ends the comic
pub fn default_is_last_page(record: &PageRecord) -> bool {
    record.next_page_url.is_none()
}

/// Returns the adapter registered under `name`
///
/// # Examples
///
/// ```
/// use comic_walker::site::site_by_name;
///
/// let site = site_by_name("xkcd").unwrap();
/// assert_eq!(site.base_identity(), "xkcd.com");
/// assert!(site_by_name("garfield").is_err());
/// ```
pub fn site_by_name(name: &str) -> Result<Arc<dyn SiteAdapter>, WalkerError> {
    match name.to_ascii_lowercase().as_str() {
        "xkcd" => Ok(Arc::new(Xkcd)),
        "pbf" => Ok(Arc::new(Pbf)),
        other => Err(WalkerError::UnknownSite(other.to_string())),
    }
}

/// Names accepted by [`site_by_name`]
pub const SITE_NAMES: &[&str] = &["xkcd", "pbf"];
