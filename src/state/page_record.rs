//! Metadata recorded for one comic page

use crate::state::PageStatus;
use chrono::{DateTime, Utc};

/// Title used when a page has none
pub const UNKNOWN_TITLE: &str = "unknown";

/// Everything the walker learned about a single page
///
/// A record is built once from a fetched page and never edited afterwards.
/// Re-crawling an unsatisfied page produces a fresh record that replaces
/// the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Page number, starting at 1
    pub number: u32,

    /// URL the page was fetched from
    pub source_url: String,

    /// Link to the following page, if one was found
    pub next_page_url: Option<String>,

    /// Image URL as written in the page markup
    pub image_url: Option<String>,

    /// Title used in the downloaded file name
    pub title: String,

    /// How the walk left this page
    pub status: PageStatus,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,
}

impl PageRecord {
    /// Builds a record, turning empty extraction results into missing values
    pub fn new(
        number: u32,
        source_url: impl Into<String>,
        next_page_url: Option<String>,
        image_url: Option<String>,
        title: Option<String>,
    ) -> Self {
        let next_page_url = non_empty(next_page_url);
        let status = if next_page_url.is_some() {
            PageStatus::Linked
        } else {
            PageStatus::Unlinked
        };

        Self {
            number,
            source_url: source_url.into(),
            next_page_url,
            image_url: non_empty(image_url),
            title: non_empty(title).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            status,
            fetched_at: Utc::now(),
        }
    }

    /// Returns the same record marked as the comic's last page
    pub fn into_last(self) -> Self {
        Self {
            status: PageStatus::Last,
            ..self
        }
    }

    /// A page is satisfied once its image URL is known
    pub fn is_satisfied(&self) -> bool {
        self.image_url.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
