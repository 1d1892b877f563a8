//! ig-saved-export - export the posts saved by an Instagram account to CSV
//!
//! This library logs in to Instagram (or reuses a saved session), walks the
//! account's saved-posts collection and flattens each post into a CSV row.
//!
//! # Features
//!
//! - Session files, password and two-factor login, browser cookie import
//! - Rate-limit-aware retry of the saved-posts request
//! - Per-post retries with skip-on-failure
//! - Videos-only filter and row limit
//! - BOM-prefixed UTF-8 CSV output
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use ig_saved_export::{export_saved_posts, Config, InstagramApi};
//! use ig_saved_export::session::{SessionManager, TerminalPrompt};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("saved-posts.toml"))?;
//!     let username = config.username()?.to_string();
//!     let api = InstagramApi::new(&config.account.user_agent, 3)?;
//!
//!     let prompt = TerminalPrompt::new();
//!     SessionManager::new(&api, &prompt, config.session_file()?)
//!         .authenticate(&username, None, None)
//!         .await?;
//!
//!     let progress = indicatif::ProgressBar::hidden();
//!     let summary =
//!         export_saved_posts(&api, &username, &config, &config.output_path()?, &progress).await?;
//!     println!("{} rows", summary.rows);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod fs;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod source;

// Re-exports for convenience
pub use api::InstagramApi;
pub use config::{Config, PostFilter};
pub use error::{Error, Result};
pub use export::{write_records, ExtractedRecord};
pub use fetch::{extract_posts, fetch_saved_posts_sequence, ExtractOptions, RetryPolicy};
pub use pipeline::{export_saved_posts, RunSummary};
pub use session::{Session, SessionManager};
pub use source::{PostCursor, Profile, SavedPost, SavedPostSource};
