//! Instagram web API response types.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// `data` envelope shared by GraphQL and web API responses.
#[derive(Debug, Deserialize)]
pub struct DataResponse<T> {
    pub data: Option<T>,
}

/// Payload of `web_profile_info`.
#[derive(Debug, Deserialize)]
pub struct ProfileData {
    pub user: Option<ProfileUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUser {
    pub id: String,
    pub username: String,
}

/// Payload of the saved-media GraphQL query.
#[derive(Debug, Deserialize)]
pub struct SavedMediaData {
    pub user: Option<SavedMediaUser>,
}

#[derive(Debug, Deserialize)]
pub struct SavedMediaUser {
    pub edge_saved_media: SavedMediaPage,
}

/// One page of saved media.
#[derive(Debug, Deserialize)]
pub struct SavedMediaPage {
    pub count: Option<u64>,
    pub page_info: PageInfo,
    #[serde(default)]
    pub edges: Vec<MediaEdge>,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MediaEdge {
    pub node: MediaNode,
}

/// Payload of the single-post GraphQL query.
#[derive(Debug, Deserialize)]
pub struct ShortcodeMediaData {
    pub shortcode_media: Option<MediaNode>,
}

/// Post metadata, as listed in a saved-media page or fetched in full.
///
/// Listing nodes leave some fields out; any of them may be missing.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaNode {
    pub shortcode: String,
    pub id: Option<String>,
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub taken_at_timestamp: Option<i64>,
    pub is_video: Option<bool>,
    pub video_url: Option<String>,
    pub edge_media_preview_like: Option<EdgeCount>,
    pub edge_liked_by: Option<EdgeCount>,
    pub edge_media_to_comment: Option<EdgeCount>,
    pub edge_media_to_parent_comment: Option<EdgeCount>,
    pub owner: Option<Owner>,
}

impl MediaNode {
    pub fn taken_at(&self) -> Option<DateTime<Utc>> {
        self.taken_at_timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }

    /// Like count; hidden counts come back negative.
    pub fn likes(&self) -> Option<u64> {
        self.edge_media_preview_like
            .as_ref()
            .or(self.edge_liked_by.as_ref())
            .and_then(EdgeCount::value)
    }

    pub fn comments(&self) -> Option<u64> {
        self.edge_media_to_comment
            .as_ref()
            .or(self.edge_media_to_parent_comment.as_ref())
            .and_then(EdgeCount::value)
    }

    pub fn owner_username(&self) -> Option<String> {
        self.owner.as_ref().and_then(|o| o.username.clone())
    }

    pub fn owner_id(&self) -> Option<String> {
        self.owner.as_ref().and_then(|o| o.id.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeCount {
    pub count: Option<i64>,
}

impl EdgeCount {
    fn value(&self) -> Option<u64> {
        self.count.and_then(|c| u64::try_from(c).ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub id: Option<String>,
    pub username: Option<String>,
}

/// Response of the login and two-factor endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    pub status: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub authenticated: bool,
    /// Whether the username exists.
    pub user: Option<bool>,
    #[serde(default)]
    pub two_factor_required: bool,
    pub two_factor_info: Option<TwoFactorInfo>,
    pub checkpoint_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TwoFactorInfo {
    pub two_factor_identifier: String,
}
