//! Opening the saved-posts collection under a rate-limit-aware retry.

use crate::error::{Error, Result};
use crate::fetch::retry::{RetryAction, RetryPolicy};
use crate::source::{Profile, SavedPostSource};

/// Request the saved-posts cursor for `profile`.
///
/// Only the request that opens the collection is retried; the cursor is
/// returned unread. Rate-limit and transient failures follow `policy`,
/// anything else aborts at once. A rate limit on the final attempt becomes
/// [`Error::RateLimited`] with remediation text.
pub async fn fetch_saved_posts_sequence<S: SavedPostSource>(
    source: &S,
    profile: &Profile,
    policy: &RetryPolicy,
) -> Result<S::Cursor> {
    let label = format!("saved posts of {}", profile.username);

    let result = policy
        .run(
            &label,
            || source.saved_posts(profile),
            |e| {
                if e.is_rate_limit() {
                    tracing::warn!("Instagram is rate limiting requests: {}", e);
                    RetryAction::Retry
                } else if e.is_transient() {
                    tracing::warn!("Failed to request saved posts: {}", e);
                    RetryAction::Retry
                } else {
                    RetryAction::Abort
                }
            },
        )
        .await;

    result.map_err(|e| {
        if e.is_rate_limit() {
            Error::RateLimited(e.to_string())
        } else {
            e
        }
    })
}
