//! Fetch module for saved-post retrieval.
//!
//! This module provides:
//! - Configurable retry schedules
//! - Rate-limit-aware opening of the saved-posts collection
//! - Filtered, limited, per-post retried extraction
//! - Extraction state tracking

pub mod extractor;
pub mod pagination;
pub mod retry;
pub mod state;

pub use extractor::{extract_posts, extract_record, ExtractOptions};
pub use pagination::fetch_saved_posts_sequence;
pub use retry::{RetryAction, RetryPolicy};
pub use state::ExtractionState;
