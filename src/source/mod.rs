//! Saved-post source abstraction.
//!
//! The extraction core only sees these traits. Every accessor may hit the
//! network and fail; transient failures are recognized through
//! [`Error::is_transient`](crate::error::Error::is_transient).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

#[cfg(test)]
pub mod mock;

/// A resolved profile whose saved posts can be listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub username: String,
}

/// A lazily loaded saved post.
#[async_trait]
pub trait SavedPost: Send + Sync {
    /// Unique post shortcode, always available without I/O.
    fn shortcode(&self) -> &str;

    async fn date_utc(&self) -> Result<DateTime<Utc>>;

    async fn typename(&self) -> Result<String>;

    /// Like count, `None` when hidden or unavailable.
    async fn likes(&self) -> Result<Option<u64>>;

    /// Comment count, `None` when unavailable.
    async fn comments(&self) -> Result<Option<u64>>;

    async fn is_video(&self) -> Result<bool>;

    /// Video URL, `None` for non-video posts.
    async fn video_url(&self) -> Result<Option<String>>;

    async fn owner_username(&self) -> Result<Option<String>>;

    async fn owner_id(&self) -> Result<Option<String>>;
}

/// Forward-only cursor over a saved-post collection.
#[async_trait]
pub trait PostCursor: Send {
    type Post: SavedPost;

    /// Next post, or `None` when the collection is exhausted.
    async fn next_post(&mut self) -> Result<Option<Self::Post>>;
}

/// Something that can list a profile's saved posts.
#[async_trait]
pub trait SavedPostSource: Send + Sync {
    type Cursor: PostCursor;

    async fn resolve_profile(&self, username: &str) -> Result<Profile>;

    /// Open the saved-post collection. This is the request that the
    /// pagination retry wraps; it must not enumerate the collection.
    async fn saved_posts(&self, profile: &Profile) -> Result<Self::Cursor>;
}
