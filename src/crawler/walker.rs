//! Sequential page walk
//!
//! The walker visits page numbers in order. Page `n + 1` is normally reached
//! through the next link stored on page `n`, so the walk is strictly
//! sequential and runs on a single task.

use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::site::{PageContent, SiteAdapter};
use crate::state::{PageRecord, PageStore};
use crate::url::normalize_url;
use reqwest::Client;
use scraper::Html;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};
use url::Url;

/// Why a walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// The requested stop page was reached
    StopReached,

    /// The site's last-page rule fired on this page
    LastPage(u32),

    /// No candidate URL for this page could be fetched
    Unreachable(u32),

    /// Cancellation was requested before this page
    Cancelled(u32),
}

/// Summary of one walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Highest page number that is stored after this walk, None if the
    /// first page could not be reached
    pub last_page: Option<u32>,

    /// Why the walk ended
    pub outcome: CrawlOutcome,

    /// Pages fetched from the network
    pub fetched: usize,

    /// Pages skipped because they were already resolved
    pub skipped: usize,
}

impl CrawlReport {
    fn new() -> Self {
        Self {
            last_page: None,
            outcome: CrawlOutcome::StopReached,
            fetched: 0,
            skipped: 0,
        }
    }

    /// Page the walk failed to reach, if it stopped on a fetch failure
    pub fn halted_at(&self) -> Option<u32> {
        match self.outcome {
            CrawlOutcome::Unreachable(number) => Some(number),
            _ => None,
        }
    }
}

/// A successfully fetched page
struct FetchedPage {
    /// Normalized URL that was requested
    source_url: String,

    /// URL relative links are resolved against (after redirects)
    base_url: Url,

    body: String,
}

/// Lists the URLs to try for a page, most trusted first
///
/// The first non-empty source wins:
/// 1. the page's own stored source URL
/// 2. the next link stored on the previous page
/// 3. the site's guesses for the page number
pub fn resolve_candidates(number: u32, store: &PageStore, adapter: &dyn SiteAdapter) -> Vec<String> {
    if let Some(record) = store.get(number) {
        if !record.source_url.trim().is_empty() {
            return vec![record.source_url.clone()];
        }
    }

    let previous_link = number
        .checked_sub(1)
        .and_then(|previous| store.get(previous))
        .and_then(|record| record.next_page_url.clone());
    if let Some(link) = previous_link {
        return vec![link];
    }

    adapter
        .guessed_urls(number)
        .into_iter()
        .filter(|url| !url.trim().is_empty())
        .collect()
}

/// Walks a comic page by page, filling a [`PageStore`]
pub struct Crawler<'a> {
    adapter: &'a dyn SiteAdapter,
    client: &'a Client,
    cancel: CancellationToken,
    span: Span,
}

impl<'a> Crawler<'a> {
    /// Creates a crawler that logs inside `span`
    pub fn new(adapter: &'a dyn SiteAdapter, client: &'a Client, span: Span) -> Self {
        Self {
            adapter,
            client,
            cancel: CancellationToken::new(),
            span,
        }
    }

    /// Stops the walk before the next page once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Walks from `start` up to `stop`, or until the last page when `stop` is None
    ///
    /// Pages already resolved in `store` are skipped without any request,
    /// except a stored last page on an unbounded walk, which is fetched
    /// again through its stored URL.
    /// Every fetched page is stored before the walk moves on, so an early
    /// halt leaves a store the next run can resume from.
    pub async fn crawl(&self, start: u32, stop: Option<u32>, store: &mut PageStore) -> CrawlReport {
        self.walk(start, stop, store)
            .instrument(self.span.clone())
            .await
    }

    async fn walk(&self, start: u32, stop: Option<u32>, store: &mut PageStore) -> CrawlReport {
        match stop {
            Some(stop) => tracing::info!("Walking pages {} to {}", start, stop),
            None => tracing::info!("Walking every page from {}", start),
        }

        let mut report = CrawlReport::new();
        let mut current = start;

        loop {
            if stop.is_some_and(|stop| current > stop) {
                report.outcome = CrawlOutcome::StopReached;
                break;
            }

            if self.cancel.is_cancelled() {
                tracing::info!("Walk cancelled before page {}", current);
                report.outcome = CrawlOutcome::Cancelled(current);
                break;
            }

            // Unbounded walks fetch a stored last page again to pick up a
            // newly published next link.
            let revisit_last = stop.is_none()
                && store
                    .get(current)
                    .is_some_and(|record| record.status.is_terminal());

            if store.is_satisfied(current) && !revisit_last {
                tracing::debug!("Page {} already resolved, skipping", current);
                report.skipped += 1;
                report.last_page = Some(current);
            } else {
                if revisit_last {
                    tracing::debug!("Checking stored last page {} for a new next link", current);
                }
                let Some(page) = self.fetch_first(current, store).await else {
                    report.outcome = self.unreachable_outcome(current, store);
                    if let CrawlOutcome::LastPage(number) = report.outcome {
                        report.last_page = Some(number);
                    }
                    break;
                };
                report.fetched += 1;

                let mut record = self.extract_record(current, &page);
                let is_last = stop.is_none() && self.adapter.is_last_page(&record);
                if is_last {
                    record = record.into_last();
                }

                store.insert(record);
                report.last_page = Some(current);

                if is_last {
                    tracing::info!("Page {} is the last page", current);
                    report.outcome = CrawlOutcome::LastPage(current);
                    break;
                }
            }

            current = match current.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }

        tracing::info!(
            "Walk finished: {} fetched, {} already resolved, outcome {:?}",
            report.fetched,
            report.skipped,
            report.outcome
        );

        report
    }

    /// Fetches the first candidate URL that answers successfully
    async fn fetch_first(&self, number: u32, store: &PageStore) -> Option<FetchedPage> {
        let candidates = resolve_candidates(number, store, self.adapter);
        if candidates.is_empty() {
            tracing::warn!("No URL known for page {}", number);
            return None;
        }

        for candidate in &candidates {
            let normalized = normalize_url(candidate);
            let url = match Url::parse(&normalized) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping malformed URL {} for page {}: {}", candidate, number, e);
                    continue;
                }
            };

            tracing::debug!("Fetching page {} from {}", number, url);
            match fetch_page(self.client, url.as_str()).await {
                FetchResult::Success {
                    final_url, body, ..
                } => {
                    let base_url = Url::parse(&final_url).unwrap_or_else(|_| url.clone());
                    return Some(FetchedPage {
                        source_url: url.to_string(),
                        base_url,
                        body,
                    });
                }
                FetchResult::HttpError { status_code } => {
                    tracing::warn!("Page {} at {} returned HTTP {}", number, url, status_code);
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!("Page {} at {} failed: {}", number, url, error);
                }
            }
        }

        tracing::warn!(
            "Could not fetch page {} from any of {} candidate URL(s)",
            number,
            candidates.len()
        );
        None
    }

    /// Runs the site adapter over a fetched page
    ///
    /// Missing fields are logged and stored empty; they never stop the walk.
    fn extract_record(&self, number: u32, page: &FetchedPage) -> PageRecord {
        let document = Html::parse_document(&page.body);
        let content = PageContent::new(&page.base_url, &document);

        let next_page_url = self.adapter.next_link_of(content, number);
        let image_url = self.adapter.image_url_of(content, number);
        let title = self.adapter.title_of(content, number);

        if next_page_url.is_none() {
            tracing::warn!("Could not find next page link on page {}", number);
        }
        if image_url.is_none() {
            tracing::warn!("Could not find image on page {}", number);
        }
        if title.is_none() {
            tracing::warn!("Could not find title on page {}", number);
        }

        PageRecord::new(number, page.source_url.clone(), next_page_url, image_url, title)
    }

    /// A stored last page, or the page past it, failing is the end of the
    /// comic, not a failure
    fn unreachable_outcome(&self, number: u32, store: &PageStore) -> CrawlOutcome {
        if store.get(number).is_some_and(|record| record.status.is_terminal()) {
            return CrawlOutcome::LastPage(number);
        }

        let previous = number.checked_sub(1).and_then(|previous| store.get(previous));
        match previous {
            Some(record) if record.status.is_terminal() => CrawlOutcome::LastPage(record.number),
            _ => CrawlOutcome::Unreachable(number),
        }
    }
}
