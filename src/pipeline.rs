//! End-to-end export of a profile's saved posts.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::export::write_records;
use crate::fetch::{extract_posts, fetch_saved_posts_sequence, ExtractionState};
use crate::source::SavedPostSource;

/// Outcome of a completed export.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub state: ExtractionState,
}

/// Resolve `username`, extract its saved posts and write them to `output`.
///
/// Any fatal error leaves `output` untouched; records extracted before an
/// abort are discarded.
pub async fn export_saved_posts<S: SavedPostSource>(
    source: &S,
    username: &str,
    config: &Config,
    output: &Path,
    progress: &ProgressBar,
) -> Result<RunSummary> {
    let profile = source
        .resolve_profile(username)
        .await
        .map_err(fatal_access_error)?;
    tracing::debug!("Resolved {} to profile id {}", profile.username, profile.id);

    progress.set_message("Requesting saved posts...");
    let mut cursor = fetch_saved_posts_sequence(source, &profile, &config.pagination_policy())
        .await
        .map_err(fatal_access_error)?;

    let mut state = ExtractionState::new();
    let records = extract_posts(&mut cursor, &config.extract_options(), &mut state, progress).await?;

    write_records(&records, output)?;
    tracing::info!("Wrote {} rows to {}", records.len(), output.display());

    Ok(RunSummary {
        output: output.to_path_buf(),
        rows: records.len(),
        state,
    })
}

/// Turn an error from the profile or collection request into its fatal form.
fn fatal_access_error(error: Error) -> Error {
    match error {
        Error::RateLimited(_) => error,
        Error::LoginRequired(message) => Error::NotAuthorized(message),
        e if e.is_rate_limit() => Error::RateLimited(e.to_string()),
        e => e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::mock::{Failure, MockPost, MockSource};

    fn quick_config() -> Config {
        let mut config = Config::default();
        config.options.sleep_seconds = 0.0;
        config
    }

    #[tokio::test(start_paused = true)]
    async fn test_exports_all_posts_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("saved.csv");
        let source = MockSource::new(vec![
            MockPost::image("A1"),
            MockPost::video("B2"),
            MockPost::image("C3"),
        ]);

        let summary = export_saved_posts(
            &source,
            "alice",
            &quick_config(),
            &output,
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.state.exported, 3);

        let content = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with('\u{feff}'));
        assert!(lines[2].starts_with("B2,"));
        assert!(lines[2].contains("https://cdn.example.com/B2.mp4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_collection_aborts_without_export() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("saved.csv");
        let source = MockSource::new(vec![MockPost::image("A1")]).failing_sequence(vec![
            Failure::RateLimit,
            Failure::RateLimit,
            Failure::RateLimit,
        ]);

        let err = export_saved_posts(
            &source,
            "alice",
            &quick_config(),
            &output,
            &ProgressBar::hidden(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::RateLimited(_)));
        assert!(err.to_string().contains("15-30 minutes"));
        assert_eq!(source.sequence_calls(), 3);
        assert!(!output.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_required_becomes_not_authorized() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("saved.csv");
        let source = MockSource::new(vec![MockPost::image("A1")])
            .failing_sequence(vec![Failure::LoginRequired]);

        let err = export_saved_posts(
            &source,
            "alice",
            &quick_config(),
            &output,
            &ProgressBar::hidden(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::NotAuthorized(_)));
        assert_eq!(source.sequence_calls(), 1);
        assert!(!output.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_and_filter_flow_through() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("videos.csv");
        let source = MockSource::new(vec![
            MockPost::image("A1"),
            MockPost::video("B2"),
            MockPost::video("C3"),
            MockPost::video("D4"),
        ]);
        let mut config = quick_config();
        config.options.filter = crate::config::PostFilter::Videos;
        config.options.max_posts = Some(2);

        let summary = export_saved_posts(&source, "alice", &config, &output, &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.state.filtered, 1);
        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("B2,"));
        assert!(content.contains("C3,"));
        assert!(!content.contains("D4,"));
    }
}
