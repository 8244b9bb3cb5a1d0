//! Concurrent image downloader
//!
//! The page range is split into contiguous chunks and every chunk gets its
//! own tokio task. Tasks share the page store read-only and write to
//! distinct, number-derived paths, so no locking is involved. The caller
//! waits for every task before the first collected error is reported.

use crate::crawler::fetch_image;
use crate::download::filename::image_path;
use crate::download::partition::partition;
use crate::state::PageStore;
use crate::url::normalize_url;
use crate::WalkerError;
use reqwest::Client;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

/// Counts of what happened to each page in a download run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Images fetched and written this run
    pub written: usize,

    /// Pages whose image file already existed
    pub already_present: usize,

    /// Pages without a usable image URL
    pub skipped: usize,

    /// Pages whose image could not be fetched or written
    pub failed: usize,
}

impl DownloadReport {
    fn merge(&mut self, other: &DownloadReport) {
        self.written += other.written;
        self.already_present += other.already_present;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// What happened to one page
enum PageDownload {
    Written(PathBuf),
    AlreadyPresent,
    Skipped,
}

/// Result of one worker's chunk
struct WorkerReport {
    counts: DownloadReport,
    first_error: Option<WalkerError>,
}

/// Downloads page images into one comic directory
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    comic_dir: PathBuf,
    concurrency: usize,
    cancel: CancellationToken,
    span: Span,
}

impl Downloader {
    /// Creates a downloader writing into `comic_dir` with `concurrency` workers
    pub fn new(client: Client, comic_dir: impl Into<PathBuf>, concurrency: usize, span: Span) -> Self {
        Self {
            client,
            comic_dir: comic_dir.into(),
            concurrency: concurrency.max(1),
            cancel: CancellationToken::new(),
            span,
        }
    }

    /// Workers stop before their next page once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Directory images are written to
    pub fn comic_dir(&self) -> &Path {
        &self.comic_dir
    }

    /// Downloads the images of every page in `pages`
    ///
    /// Pages without an image URL, with an unknown extension, or whose file
    /// already exists are skipped without a request. Failures are collected
    /// per worker; once every worker has finished, the first failure (in
    /// chunk order) is returned.
    pub async fn download(
        &self,
        pages: RangeInclusive<u32>,
        store: Arc<PageStore>,
    ) -> Result<DownloadReport, WalkerError> {
        self.run(pages, store).instrument(self.span.clone()).await
    }

    async fn run(
        &self,
        pages: RangeInclusive<u32>,
        store: Arc<PageStore>,
    ) -> Result<DownloadReport, WalkerError> {
        let chunks = partition(pages.clone(), self.concurrency);
        if chunks.is_empty() {
            tracing::debug!("No pages to download");
            return Ok(DownloadReport::default());
        }

        tokio::fs::create_dir_all(&self.comic_dir)
            .await
            .map_err(|source| WalkerError::Write {
                path: self.comic_dir.clone(),
                source,
            })?;

        tracing::info!(
            "Downloading pages {} to {} with {} worker(s)",
            pages.start(),
            pages.end(),
            chunks.len()
        );

        let handles: Vec<JoinHandle<WorkerReport>> = chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let worker = ChunkWorker {
                    client: self.client.clone(),
                    comic_dir: self.comic_dir.clone(),
                    store: Arc::clone(&store),
                    cancel: self.cancel.clone(),
                };
                let span = tracing::debug_span!("worker", index);
                tokio::spawn(worker.run(chunk).instrument(span))
            })
            .collect();

        let mut report = DownloadReport::default();
        let mut first_error = None;

        for (index, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(worker) => {
                    report.merge(&worker.counts);
                    if first_error.is_none() {
                        first_error = worker.first_error;
                    }
                }
                Err(e) => {
                    tracing::error!("Download worker {} did not finish: {}", index, e);
                    if first_error.is_none() {
                        first_error = Some(WalkerError::Worker(e.to_string()));
                    }
                }
            }
        }

        tracing::info!(
            "Download finished: {} written, {} already present, {} skipped, {} failed",
            report.written,
            report.already_present,
            report.skipped,
            report.failed
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

/// Everything one worker task needs, owned so the task is `'static`
struct ChunkWorker {
    client: Client,
    comic_dir: PathBuf,
    store: Arc<PageStore>,
    cancel: CancellationToken,
}

impl ChunkWorker {
    async fn run(self, chunk: RangeInclusive<u32>) -> WorkerReport {
        let mut counts = DownloadReport::default();
        let mut first_error = None;

        for number in chunk {
            if self.cancel.is_cancelled() {
                tracing::info!("Download cancelled before page {}", number);
                break;
            }

            match self.download_page(number).await {
                Ok(PageDownload::Written(path)) => {
                    tracing::debug!("Saved page {} to {}", number, path.display());
                    counts.written += 1;
                }
                Ok(PageDownload::AlreadyPresent) => counts.already_present += 1,
                Ok(PageDownload::Skipped) => counts.skipped += 1,
                Err(e) => {
                    tracing::warn!("Page {} image not downloaded: {}", number, e);
                    counts.failed += 1;
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        WorkerReport {
            counts,
            first_error,
        }
    }

    async fn download_page(&self, number: u32) -> Result<PageDownload, WalkerError> {
        let Some(record) = self.store.get(number) else {
            tracing::warn!("No information stored for page {}", number);
            return Ok(PageDownload::Skipped);
        };

        let Some(image_url) = record.image_url.as_deref() else {
            tracing::warn!("Page {} has no image URL", number);
            return Ok(PageDownload::Skipped);
        };

        let Some(path) = image_path(&self.comic_dir, record) else {
            tracing::warn!(
                "Could not work out a file name for page {} from {}",
                number,
                image_url
            );
            return Ok(PageDownload::Skipped);
        };

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!("Page {} image already downloaded", number);
            return Ok(PageDownload::AlreadyPresent);
        }

        let url = normalize_url(image_url);
        tracing::debug!("Downloading page {} image from {}", number, url);
        let bytes = fetch_image(&self.client, &url).await?;

        write_file(&path, &bytes).await?;
        Ok(PageDownload::Written(path))
    }
}

/// Writes through a `.part` file so an interrupted write never looks finished
async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), WalkerError> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    tokio::fs::write(&partial, bytes)
        .await
        .map_err(|source| WalkerError::Write {
            path: partial.clone(),
            source,
        })?;

    tokio::fs::rename(&partial, path)
        .await
        .map_err(|source| WalkerError::Write {
            path: path.to_path_buf(),
            source,
        })
}
