//! Lazily loaded saved post.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use crate::api::client::InstagramApi;
use crate::api::types::MediaNode;
use crate::error::{Error, Result};
use crate::source::SavedPost;

/// A post from a saved-media page.
///
/// Fields the listing node lacks are read from the full post metadata,
/// fetched at most once on first need. A failed fetch is retried on the
/// next access.
pub struct InstagramPost {
    api: InstagramApi,
    node: MediaNode,
    full: OnceCell<MediaNode>,
}

impl InstagramPost {
    pub fn new(api: InstagramApi, node: MediaNode) -> Self {
        Self {
            api,
            node,
            full: OnceCell::new(),
        }
    }

    async fn metadata(&self) -> Result<&MediaNode> {
        self.full
            .get_or_try_init(|| self.api.get_post(&self.node.shortcode))
            .await
    }

    /// Read a field from the listing node, falling back to full metadata.
    async fn lookup<T, F>(&self, field: F) -> Result<Option<T>>
    where
        T: Send,
        F: Fn(&MediaNode) -> Option<T> + Send + Sync,
    {
        if let Some(value) = field(&self.node) {
            return Ok(Some(value));
        }
        Ok(field(self.metadata().await?))
    }

    fn missing(&self, field: &str) -> Error {
        Error::BadResponse(format!(
            "post {} has no {}",
            self.node.shortcode, field
        ))
    }
}

#[async_trait]
impl SavedPost for InstagramPost {
    fn shortcode(&self) -> &str {
        &self.node.shortcode
    }

    async fn date_utc(&self) -> Result<DateTime<Utc>> {
        self.lookup(MediaNode::taken_at)
            .await?
            .ok_or_else(|| self.missing("timestamp"))
    }

    async fn typename(&self) -> Result<String> {
        self.lookup(|node| node.typename.clone())
            .await?
            .ok_or_else(|| self.missing("type"))
    }

    async fn likes(&self) -> Result<Option<u64>> {
        self.lookup(MediaNode::likes).await
    }

    async fn comments(&self) -> Result<Option<u64>> {
        self.lookup(MediaNode::comments).await
    }

    async fn is_video(&self) -> Result<bool> {
        Ok(self.lookup(|node| node.is_video).await?.unwrap_or(false))
    }

    async fn video_url(&self) -> Result<Option<String>> {
        if !self.is_video().await? {
            return Ok(None);
        }
        self.lookup(|node| node.video_url.clone()).await
    }

    async fn owner_username(&self) -> Result<Option<String>> {
        self.lookup(MediaNode::owner_username).await
    }

    async fn owner_id(&self) -> Result<Option<String>> {
        self.lookup(MediaNode::owner_id).await
    }
}
