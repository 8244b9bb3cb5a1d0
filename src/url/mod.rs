//! URL handling module for Comic-Walker
//!
//! Scraped page and image URLs are often protocol-relative or schemeless;
//! this module turns them into fetchable URLs and pulls the image extension
//! used to name downloaded files.

mod extension;
mod normalize;

// Re-export main functions
pub use extension::image_extension;
pub use normalize::normalize_url;
