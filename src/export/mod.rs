//! Export module.
//!
//! Provides:
//! - The flat per-post record and its column order
//! - BOM-prefixed UTF-8 CSV writing

pub mod record;
pub mod writer;

pub use record::{post_url, ExtractedRecord, COLUMNS};
pub use writer::write_records;
