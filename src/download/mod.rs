//! Download module for page images
//!
//! This module contains:
//! - Range partitioning into per-worker chunks
//! - Deterministic file naming (`NNNNNN__title.ext`)
//! - The concurrent downloader itself

mod downloader;
mod filename;
mod partition;

pub use downloader::{DownloadReport, Downloader};
pub use filename::{image_file_name, image_path};
pub use partition::partition;
