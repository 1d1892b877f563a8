//! Filtering, limiting and per-post extraction.

use std::time::Duration;

use indicatif::ProgressBar;
use tokio::time::sleep;

use crate::config::PostFilter;
use crate::error::{Error, Result};
use crate::export::{post_url, ExtractedRecord};
use crate::fetch::retry::{RetryAction, RetryPolicy};
use crate::fetch::state::ExtractionState;
use crate::source::{PostCursor, SavedPost};

/// Options for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub filter: PostFilter,
    /// Maximum number of exported records, `None` for no limit.
    pub limit: Option<usize>,
    /// Sleep after each processed post.
    pub inter_request_delay: Duration,
    /// Per-post retry schedule.
    pub retry: RetryPolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            filter: PostFilter::All,
            limit: None,
            inter_request_delay: Duration::from_secs(3),
            retry: RetryPolicy::per_post(),
        }
    }
}

/// Result of processing a single post.
enum PostOutcome {
    Exported(ExtractedRecord),
    Filtered,
    Skipped,
}

/// Walk the cursor and extract one record per accepted post.
///
/// Filtered posts don't count towards the limit. A post that keeps failing
/// is skipped and the run goes on; a failure to advance the cursor aborts
/// the run.
pub async fn extract_posts<C: PostCursor>(
    cursor: &mut C,
    options: &ExtractOptions,
    state: &mut ExtractionState,
    progress: &ProgressBar,
) -> Result<Vec<ExtractedRecord>> {
    let mut records = Vec::new();

    while !limit_reached(options.limit, records.len()) {
        let post = match cursor.next_post().await {
            Ok(Some(post)) => post,
            Ok(None) => break,
            Err(e) => return Err(abort_extraction(e)),
        };
        state.mark_seen();
        progress.inc(1);

        match process_post(&post, options, state).await {
            PostOutcome::Filtered => {
                state.mark_filtered();
                tracing::debug!("Filtered out {}", post.shortcode());
                continue;
            }
            PostOutcome::Exported(record) => {
                state.mark_exported();
                tracing::debug!("Extracted {}", record.shortcode);
                records.push(record);
            }
            PostOutcome::Skipped => {
                state.mark_skipped();
                tracing::warn!("Skipping post {} after retries", post.shortcode());
            }
        }

        progress.set_message(format!(
            "{} exported, {} skipped",
            state.exported, state.skipped
        ));

        if limit_reached(options.limit, records.len()) {
            break;
        }

        if !options.inter_request_delay.is_zero() {
            sleep(options.inter_request_delay).await;
        }
    }

    Ok(records)
}

fn limit_reached(limit: Option<usize>, exported: usize) -> bool {
    limit.is_some_and(|limit| exported >= limit)
}

/// What one attempt at a post produced.
enum Attempt {
    Filtered,
    Record(ExtractedRecord),
}

/// Filter and extract one post under a single per-post retry schedule.
async fn process_post<P: SavedPost>(
    post: &P,
    options: &ExtractOptions,
    state: &mut ExtractionState,
) -> PostOutcome {
    let shortcode = post.shortcode().to_string();

    let attempt = options
        .retry
        .run(
            &shortcode,
            || attempt_post(post, options.filter),
            |e| classify_post_error(&shortcode, e, state),
        )
        .await;

    match attempt {
        Ok(Attempt::Filtered) => PostOutcome::Filtered,
        Ok(Attempt::Record(record)) => {
            if record.videos && record.video_url.is_none() {
                state.mark_missing_video_url();
            }
            PostOutcome::Exported(record)
        }
        Err(e) => {
            tracing::warn!("Failed {}: {}", shortcode, e);
            PostOutcome::Skipped
        }
    }
}

async fn attempt_post<P: SavedPost>(post: &P, filter: PostFilter) -> Result<Attempt> {
    if !filter.matches(post).await? {
        return Ok(Attempt::Filtered);
    }
    extract_record(post).await.map(Attempt::Record)
}

fn classify_post_error(shortcode: &str, error: &Error, state: &mut ExtractionState) -> RetryAction {
    if error.is_transient() {
        tracing::warn!("Error fetching metadata of {}: {}", shortcode, error);
        state.mark_retry();
        RetryAction::Retry
    } else {
        RetryAction::Abort
    }
}

/// Read every exported field of a post.
pub async fn extract_record<P: SavedPost + ?Sized>(post: &P) -> Result<ExtractedRecord> {
    // The owner id avoids an extra profile lookup when the name is missing
    let owner_username = match post.owner_username().await? {
        Some(name) if !name.is_empty() => Some(name),
        _ => post.owner_id().await?,
    };

    let shortcode = post.shortcode().to_string();
    let date_utc = post.date_utc().await?;
    let typename = post.typename().await?;
    let likes = post.likes().await?;
    let comments = post.comments().await?;
    let videos = post.is_video().await?;
    let video_url = resolve_video_url(post, videos).await?;

    Ok(ExtractedRecord {
        url: post_url(&shortcode),
        shortcode,
        date_utc,
        typename,
        likes,
        comments,
        owner_username,
        videos,
        video_url,
    })
}

/// Video URL of a post, `None` when it is not a video or the resource
/// can no longer be fetched.
async fn resolve_video_url<P: SavedPost + ?Sized>(post: &P, is_video: bool) -> Result<Option<String>> {
    if !is_video {
        return Ok(None);
    }

    match post.video_url().await {
        Ok(url) => Ok(url),
        Err(e) if e.is_transient() => {
            tracing::warn!("Video not available for {}: {}", post.shortcode(), e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Map a failure to advance the cursor to a run-aborting error.
fn abort_extraction(error: Error) -> Error {
    if error.is_rate_limit() {
        return Error::RateLimited(error.to_string());
    }
    match error {
        Error::LoginRequired(message) => Error::NotAuthorized(message),
        e if e.is_transient() => Error::Extraction(e.to_string()),
        e => e,
    }
}
