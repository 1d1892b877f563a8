//! Post filter definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::source::SavedPost;

/// Which saved posts are exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostFilter {
    /// Every saved post (default).
    #[default]
    All,
    /// Only posts whose `is_video` is true.
    Videos,
}

impl PostFilter {
    /// Build the filter from the videos-only toggle.
    pub fn from_videos_only(videos_only: bool) -> Self {
        if videos_only {
            PostFilter::Videos
        } else {
            PostFilter::All
        }
    }

    /// Check whether a post passes the filter.
    ///
    /// `All` never touches the post, so it cannot fail.
    pub async fn matches<P: SavedPost + ?Sized>(&self, post: &P) -> Result<bool> {
        match self {
            PostFilter::All => Ok(true),
            PostFilter::Videos => post.is_video().await,
        }
    }
}

impl fmt::Display for PostFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostFilter::All => write!(f, "all"),
            PostFilter::Videos => write!(f, "videos"),
        }
    }
}

impl FromStr for PostFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(PostFilter::All),
            "videos" | "video" => Ok(PostFilter::Videos),
            _ => Err(format!("Unknown post filter: {}", s)),
        }
    }
}
