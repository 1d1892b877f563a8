//! Flat per-post export record.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Base URL for post permalinks.
pub const POST_URL_BASE: &str = "https://www.instagram.com/p/";

/// Column order of the exported CSV.
pub const COLUMNS: [&str; 9] = [
    "shortcode",
    "date_utc",
    "typename",
    "likes",
    "comments",
    "url",
    "owner_username",
    "videos",
    "video_url",
];

/// One exported row. Field order matches [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedRecord {
    pub shortcode: String,
    #[serde(serialize_with = "serialize_iso_utc")]
    pub date_utc: DateTime<Utc>,
    pub typename: String,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub url: String,
    /// Owner username, or the numeric owner id when the name is unresolved.
    pub owner_username: Option<String>,
    pub videos: bool,
    pub video_url: Option<String>,
}

/// Permalink for a post.
pub fn post_url(shortcode: &str) -> String {
    format!("{}{}/", POST_URL_BASE, shortcode)
}

fn serialize_iso_utc<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format("%Y-%m-%dT%H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_url() {
        assert_eq!(post_url("Cabc123"), "https://www.instagram.com/p/Cabc123/");
    }
}
