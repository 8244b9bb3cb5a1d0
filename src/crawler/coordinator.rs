//! Scrape coordinator - ties the walk, the download and the cache together
//!
//! One scrape:
//! - Records a run in the cache
//! - Loads the comic's stored pages (or starts from a caller-supplied store)
//! - Walks the comic to fill in missing pages
//! - Downloads every reached page's image
//! - Saves the store back, whatever happened during the download

use crate::config::Config;
use crate::crawler::walker::{CrawlOutcome, CrawlReport, Crawler};
use crate::crawler::build_http_client;
use crate::download::{DownloadReport, Downloader};
use crate::site::{site_by_name, SiteAdapter};
use crate::state::PageStore;
use crate::storage::{open_cache, PersistentCache, RunStatus};
use crate::WalkerError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// What one scrape did
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    /// Base identity of the scraped comic
    pub identity: String,

    /// Run ID recorded in the cache
    pub run_id: i64,

    /// Status the run was finished with
    pub status: RunStatus,

    pub crawl: CrawlReport,
    pub download: DownloadReport,
}

/// Scrapes one comic into a cache and an output directory
pub struct Scraper<C: PersistentCache> {
    adapter: Arc<dyn SiteAdapter>,
    cache: C,
    client: Client,
    output_dir: PathBuf,
    concurrency: usize,
    config_hash: String,
    cancel: CancellationToken,
}

impl<C: PersistentCache> Scraper<C> {
    /// Creates a scraper writing images under `output_dir/<identity>`
    pub fn new(
        adapter: Arc<dyn SiteAdapter>,
        cache: C,
        client: Client,
        output_dir: impl Into<PathBuf>,
        concurrency: usize,
    ) -> Self {
        Self {
            adapter,
            cache,
            client,
            output_dir: output_dir.into(),
            concurrency,
            config_hash: String::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a scraper with the client and limits described by `config`
    pub fn from_config(
        config: &Config,
        adapter: Arc<dyn SiteAdapter>,
        cache: C,
    ) -> Result<Self, WalkerError> {
        let client = build_http_client(&config.user_agent, &config.scraper)?;
        Ok(Self::new(
            adapter,
            cache,
            client,
            &config.output.directory,
            config.scraper.concurrency,
        ))
    }

    /// Hash of the configuration, recorded on every run
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    /// Both phases stop early once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn identity(&self) -> &str {
        self.adapter.base_identity()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Directory this comic's images are written to
    pub fn comic_dir(&self) -> PathBuf {
        self.output_dir.join(self.identity())
    }

    /// Scrapes pages from `start` to `stop` (or to the comic's last page)
    ///
    /// `initial` replaces the stored pages as the starting point when given.
    /// The store is saved even when the download fails; in that case the
    /// first download error is returned after saving.
    pub async fn scrape(
        &mut self,
        start: u32,
        stop: Option<u32>,
        initial: Option<PageStore>,
    ) -> Result<ScrapeReport, WalkerError> {
        let span = tracing::info_span!("scrape", comic = %self.identity());
        self.run(start, stop, initial).instrument(span).await
    }

    async fn run(
        &mut self,
        start: u32,
        stop: Option<u32>,
        initial: Option<PageStore>,
    ) -> Result<ScrapeReport, WalkerError> {
        let identity = self.identity().to_string();
        let run_id = self
            .cache
            .begin_run(&identity, &self.config_hash, start, stop)?;

        let mut store = match initial {
            Some(store) => store,
            None => match self.cache.load(&identity) {
                Ok(stored) => stored.unwrap_or_default(),
                Err(e) => {
                    tracing::error!("Failed to load pages for {}: {}", identity, e);
                    self.cache
                        .finish_run(run_id, RunStatus::Failed, None, None)?;
                    return Err(e.into());
                }
            },
        };
        tracing::info!(
            "Starting run {} with {} stored page(s), {} resolved",
            run_id,
            store.len(),
            store.satisfied_count()
        );

        let crawler = Crawler::new(
            self.adapter.as_ref(),
            &self.client,
            tracing::info_span!("crawl"),
        )
        .with_cancellation(self.cancel.clone());
        let crawl = crawler.crawl(start, stop, &mut store).await;

        let store = Arc::new(store);
        let download = match crawl.last_page {
            Some(last) if last >= start && !matches!(crawl.outcome, CrawlOutcome::Cancelled(_)) => {
                let downloader = Downloader::new(
                    self.client.clone(),
                    self.comic_dir(),
                    self.concurrency,
                    tracing::info_span!("download"),
                )
                .with_cancellation(self.cancel.clone());
                downloader.download(start..=last, Arc::clone(&store)).await
            }
            _ => {
                tracing::info!("No pages reached, nothing to download");
                Ok(DownloadReport::default())
            }
        };

        let saved = self.cache.save(&identity, &store);
        if let Err(e) = &saved {
            tracing::error!("Failed to save pages for {}: {}", identity, e);
        }

        let status = run_status(&crawl, download.is_ok() && saved.is_ok(), &self.cancel);
        self.cache
            .finish_run(run_id, status, crawl.last_page, crawl.halted_at())?;

        saved?;
        let download = download?;

        tracing::info!("Run {} finished as {}", run_id, status.to_db_string());

        Ok(ScrapeReport {
            identity,
            run_id,
            status,
            crawl,
            download,
        })
    }

    /// Forgets every stored page of this comic
    pub fn reset(&mut self) -> Result<(), WalkerError> {
        let identity = self.identity().to_string();
        self.cache.reset(&identity)?;
        tracing::info!("Cleared stored pages for {}", identity);
        Ok(())
    }
}

fn run_status(crawl: &CrawlReport, succeeded: bool, cancel: &CancellationToken) -> RunStatus {
    if !succeeded {
        return RunStatus::Failed;
    }
    match crawl.outcome {
        CrawlOutcome::Cancelled(_) => RunStatus::Cancelled,
        CrawlOutcome::Unreachable(_) => RunStatus::Halted,
        _ if cancel.is_cancelled() => RunStatus::Cancelled,
        CrawlOutcome::StopReached | CrawlOutcome::LastPage(_) => RunStatus::Completed,
    }
}

/// Runs one complete scrape of `site` as configured
///
/// Opens the cache at `output.database-path`; the connection is closed
/// when this returns, on success or failure.
///
/// # Example
///
/// ```no_run
/// use comic_walker::config::load_config_with_hash;
/// use comic_walker::crawler::run_scrape;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("config.toml"))?;
/// let report = run_scrape(&config, &hash, "xkcd", 1, Some(10), CancellationToken::new()).await?;
/// println!("reached page {:?}", report.crawl.last_page);
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(
    config: &Config,
    config_hash: &str,
    site: &str,
    start: u32,
    stop: Option<u32>,
    cancel: CancellationToken,
) -> Result<ScrapeReport, WalkerError> {
    let adapter = site_by_name(site)?;
    let cache = open_cache(Path::new(&config.output.database_path))?;
    let mut scraper = Scraper::from_config(config, adapter, cache)?
        .with_config_hash(config_hash)
        .with_cancellation(cancel);
    scraper.scrape(start, stop, None).await
}
