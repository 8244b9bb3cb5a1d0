//! State module for tracking what is known about a comic
//!
//! # Components
//!
//! - `PageRecord`: metadata for one page (source URL, next link, image URL, title)
//! - `PageStatus`: how the walk left a stored page
//! - `PageStore`: every known page of one comic, keyed by number

mod page_record;
mod page_state;
mod page_store;

// Re-export main types
pub use page_record::{PageRecord, UNKNOWN_TITLE};
pub use page_state::PageStatus;
pub use page_store::PageStore;
