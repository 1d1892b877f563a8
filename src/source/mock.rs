//! Deterministic in-memory source for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::source::{PostCursor, Profile, SavedPost, SavedPostSource};

/// Kind of failure a mock call produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Connection,
    BadResponse,
    LoginRequired,
    RateLimit,
    Unexpected,
}

impl Failure {
    pub fn to_error(self, context: &str) -> Error {
        match self {
            Failure::Connection => {
                Error::Connection(format!("connection reset while fetching {}", context))
            }
            Failure::BadResponse => {
                Error::BadResponse(format!("400 Bad Request when accessing {}", context))
            }
            Failure::LoginRequired => {
                Error::LoginRequired(format!("redirected to login page for {}", context))
            }
            Failure::RateLimit => {
                Error::Connection("Please wait a few minutes before you try again.".to_string())
            }
            Failure::Unexpected => Error::Json(
                serde_json::from_str::<u8>("not json").expect_err("invalid json must fail"),
            ),
        }
    }
}

/// A saved post with scripted failures.
#[derive(Debug)]
pub struct MockPost {
    pub shortcode: String,
    pub date_utc: DateTime<Utc>,
    pub typename: String,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub is_video: bool,
    pub video_url: Option<String>,
    pub owner_username: Option<String>,
    pub owner_id: Option<String>,
    metadata_failures: AtomicU32,
    metadata_failure: Failure,
    video_url_failure: Option<Failure>,
    metadata_calls: AtomicU32,
    is_video_failures: AtomicU32,
}

impl MockPost {
    pub fn image(shortcode: &str) -> Self {
        Self {
            shortcode: shortcode.to_string(),
            date_utc: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            typename: "GraphImage".to_string(),
            likes: Some(10),
            comments: Some(2),
            is_video: false,
            video_url: None,
            owner_username: Some("owner".to_string()),
            owner_id: Some("1001".to_string()),
            metadata_failures: AtomicU32::new(0),
            metadata_failure: Failure::Connection,
            video_url_failure: None,
            metadata_calls: AtomicU32::new(0),
            is_video_failures: AtomicU32::new(0),
        }
    }

    pub fn video(shortcode: &str) -> Self {
        Self {
            typename: "GraphVideo".to_string(),
            is_video: true,
            video_url: Some(format!("https://cdn.example.com/{}.mp4", shortcode)),
            ..Self::image(shortcode)
        }
    }

    /// Fail the first `times` metadata reads with `failure`.
    pub fn failing_metadata(self, times: u32, failure: Failure) -> Self {
        Self {
            metadata_failures: AtomicU32::new(times),
            metadata_failure: failure,
            ..self
        }
    }

    /// Fail the first `times` media type reads with `failure`.
    pub fn failing_is_video(self, times: u32, failure: Failure) -> Self {
        Self {
            is_video_failures: AtomicU32::new(times),
            metadata_failure: failure,
            ..self
        }
    }

    /// Fail every video URL read with `failure`.
    pub fn failing_video_url(self, failure: Failure) -> Self {
        Self {
            video_url_failure: Some(failure),
            ..self
        }
    }

    pub fn with_owner(self, username: Option<&str>, id: Option<&str>) -> Self {
        Self {
            owner_username: username.map(str::to_string),
            owner_id: id.map(str::to_string),
            ..self
        }
    }

    /// Number of extraction attempts made against this post.
    pub fn metadata_calls(&self) -> u32 {
        self.metadata_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SavedPost for Arc<MockPost> {
    fn shortcode(&self) -> &str {
        &self.shortcode
    }

    async fn date_utc(&self) -> Result<DateTime<Utc>> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.metadata_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.metadata_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(self.metadata_failure.to_error(&self.shortcode));
        }
        Ok(self.date_utc)
    }

    async fn typename(&self) -> Result<String> {
        Ok(self.typename.clone())
    }

    async fn likes(&self) -> Result<Option<u64>> {
        Ok(self.likes)
    }

    async fn comments(&self) -> Result<Option<u64>> {
        Ok(self.comments)
    }

    async fn is_video(&self) -> Result<bool> {
        let remaining = self.is_video_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.is_video_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(self.metadata_failure.to_error(&self.shortcode));
        }
        Ok(self.is_video)
    }

    async fn video_url(&self) -> Result<Option<String>> {
        if let Some(failure) = self.video_url_failure {
            return Err(failure.to_error(&self.shortcode));
        }
        Ok(self.video_url.clone())
    }

    async fn owner_username(&self) -> Result<Option<String>> {
        Ok(self.owner_username.clone())
    }

    async fn owner_id(&self) -> Result<Option<String>> {
        Ok(self.owner_id.clone())
    }
}

/// Cursor over a fixed list of mock posts.
pub struct MockCursor {
    posts: VecDeque<Arc<MockPost>>,
    fail_at: Option<(usize, Failure)>,
    yielded: usize,
    requests: Arc<AtomicUsize>,
}

impl MockCursor {
    pub fn new(posts: Vec<Arc<MockPost>>) -> Self {
        Self {
            posts: posts.into(),
            fail_at: None,
            yielded: 0,
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail once `index` posts have been yielded, as a broken next page would.
    pub fn failing_at(self, index: usize, failure: Failure) -> Self {
        Self {
            fail_at: Some((index, failure)),
            ..self
        }
    }

    /// Shared counter of `next_post` calls.
    pub fn requests(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl PostCursor for MockCursor {
    type Post = Arc<MockPost>;

    async fn next_post(&mut self) -> Result<Option<Self::Post>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some((index, failure)) = self.fail_at {
            if self.yielded == index {
                return Err(failure.to_error("next page"));
            }
        }
        let post = self.posts.pop_front();
        if post.is_some() {
            self.yielded += 1;
        }
        Ok(post)
    }
}

/// Source whose collection request fails a scripted number of times.
pub struct MockSource {
    posts: Vec<Arc<MockPost>>,
    sequence_failures: Mutex<VecDeque<Failure>>,
    sequence_calls: AtomicU32,
}

impl MockSource {
    pub fn new(posts: Vec<MockPost>) -> Self {
        Self {
            posts: posts.into_iter().map(Arc::new).collect(),
            sequence_failures: Mutex::new(VecDeque::new()),
            sequence_calls: AtomicU32::new(0),
        }
    }

    /// Fail the collection request once per listed failure, in order.
    pub fn failing_sequence(self, failures: Vec<Failure>) -> Self {
        Self {
            sequence_failures: Mutex::new(failures.into()),
            ..self
        }
    }

    pub fn sequence_calls(&self) -> u32 {
        self.sequence_calls.load(Ordering::SeqCst)
    }

    pub fn posts(&self) -> &[Arc<MockPost>] {
        &self.posts
    }
}

#[async_trait]
impl SavedPostSource for MockSource {
    type Cursor = MockCursor;

    async fn resolve_profile(&self, username: &str) -> Result<Profile> {
        Ok(Profile {
            id: "42".to_string(),
            username: username.to_string(),
        })
    }

    async fn saved_posts(&self, _profile: &Profile) -> Result<Self::Cursor> {
        self.sequence_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.sequence_failures.lock().unwrap().pop_front();
        if let Some(failure) = failure {
            return Err(failure.to_error("saved posts"));
        }
        Ok(MockCursor::new(self.posts.clone()))
    }
}
