//! Saved-post collection backed by the saved-media GraphQL query.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;

use crate::api::client::InstagramApi;
use crate::api::post::InstagramPost;
use crate::api::types::{MediaNode, SavedMediaPage};
use crate::error::{Error, Result};
use crate::source::{PostCursor, Profile, SavedPostSource};

/// Forward-only cursor over a profile's saved posts.
///
/// Pages are requested as the buffer drains. Shortcodes already yielded are
/// dropped, since pages can overlap when the collection changes mid-run.
pub struct SavedPostsCursor {
    api: InstagramApi,
    profile_id: String,
    buffer: VecDeque<MediaNode>,
    end_cursor: Option<String>,
    has_next_page: bool,
    seen: HashSet<String>,
}

impl SavedPostsCursor {
    /// Request the first page.
    pub async fn open(api: InstagramApi, profile_id: String) -> Result<Self> {
        let page = api.get_saved_media_page(&profile_id, None).await?;
        let mut cursor = Self {
            api,
            profile_id,
            buffer: VecDeque::new(),
            end_cursor: None,
            has_next_page: false,
            seen: HashSet::new(),
        };
        cursor.absorb(page);
        Ok(cursor)
    }

    fn absorb(&mut self, page: SavedMediaPage) {
        let empty = page.edges.is_empty();
        self.end_cursor = page.page_info.end_cursor;
        self.has_next_page = page.page_info.has_next_page && self.end_cursor.is_some() && !empty;
        self.buffer.extend(page.edges.into_iter().map(|edge| edge.node));
    }
}

#[async_trait]
impl PostCursor for SavedPostsCursor {
    type Post = InstagramPost;

    async fn next_post(&mut self) -> Result<Option<InstagramPost>> {
        loop {
            while let Some(node) = self.buffer.pop_front() {
                if self.seen.insert(node.shortcode.clone()) {
                    return Ok(Some(InstagramPost::new(self.api.clone(), node)));
                }
                tracing::debug!("Dropping repeated saved post {}", node.shortcode);
            }

            if !self.has_next_page {
                return Ok(None);
            }

            let page = self
                .api
                .get_saved_media_page(&self.profile_id, self.end_cursor.as_deref())
                .await?;
            self.absorb(page);
        }
    }
}

#[async_trait]
impl SavedPostSource for InstagramApi {
    type Cursor = SavedPostsCursor;

    async fn resolve_profile(&self, username: &str) -> Result<Profile> {
        self.get_profile(username).await
    }

    async fn saved_posts(&self, profile: &Profile) -> Result<SavedPostsCursor> {
        match self.logged_in_as().await {
            Some(user) if user.eq_ignore_ascii_case(&profile.username) => {}
            Some(user) => {
                return Err(Error::LoginRequired(format!(
                    "logged in as {}; saved posts of {} are only visible to that account",
                    user, profile.username
                )));
            }
            None => {
                return Err(Error::LoginRequired(
                    "saved posts require a logged-in session".to_string(),
                ));
            }
        }

        SavedPostsCursor::open(self.clone(), profile.id.clone()).await
    }
}
