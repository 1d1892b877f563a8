//! Instagram web API HTTP client.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

use crate::api::types::*;
use crate::error::{is_rate_limit_message, Error, Result};
use crate::source::Profile;

/// Instagram web base URL.
const BASE_URL: &str = "https://www.instagram.com/";

/// App id the web client sends with API requests.
const IG_APP_ID: &str = "936619743392459";

/// GraphQL query listing a user's saved media.
const SAVED_MEDIA_QUERY_HASH: &str = "f883d95537fbcd400f466f63d42bd8a1";

/// GraphQL query returning a single post.
const POST_QUERY_HASH: &str = "2b0673e0dc4580674a88d426fe00ea90";

/// Saved posts requested per page.
pub const SAVED_PAGE_SIZE: u32 = 12;

/// Instagram web API client holding the session cookies.
#[derive(Clone)]
pub struct InstagramApi {
    client: Client,
    jar: Arc<Jar>,
    base_url: Url,
    logged_in_as: Arc<RwLock<Option<String>>>,
    max_connection_attempts: u32,
}

impl InstagramApi {
    /// Create a client for instagram.com.
    pub fn new(user_agent: &str, max_connection_attempts: u32) -> Result<Self> {
        Self::with_base_url(user_agent, max_connection_attempts, Url::parse(BASE_URL)?)
    }

    /// Create a client against another host serving the same API.
    pub fn with_base_url(
        user_agent: &str,
        max_connection_attempts: u32,
        base_url: Url,
    ) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            jar,
            base_url,
            logged_in_as: Arc::new(RwLock::new(None)),
            max_connection_attempts: max_connection_attempts.max(1),
        })
    }

    /// Username of the logged-in session, if any.
    pub async fn logged_in_as(&self) -> Option<String> {
        self.logged_in_as.read().await.clone()
    }

    pub(crate) async fn set_logged_in_as(&self, username: &str) {
        *self.logged_in_as.write().await = Some(username.to_string());
    }

    /// Cookies currently held for the Instagram host.
    pub fn cookies(&self) -> BTreeMap<String, String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(parse_cookie_header))
            .unwrap_or_default()
    }

    pub(crate) fn add_cookie(&self, name: &str, value: &str) {
        self.jar
            .add_cookie_str(&format!("{}={}; Path=/", name, value), &self.base_url);
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Build common headers for API requests.
    pub(crate) fn build_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert("X-IG-App-ID", header::HeaderValue::from_static(IG_APP_ID));
        headers.insert(
            "X-Requested-With",
            header::HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(
            header::REFERER,
            header::HeaderValue::from_str(self.base_url.as_str())
                .map_err(|e| Error::Config(format!("Invalid base URL header: {}", e)))?,
        );
        if let Some(token) = self.cookies().get("csrftoken") {
            headers.insert(
                "X-CSRFToken",
                header::HeaderValue::from_str(token)
                    .map_err(|e| Error::BadResponse(format!("Invalid CSRF token: {}", e)))?,
            );
        }
        Ok(headers)
    }

    /// Send a request, resending immediately on connection failures.
    pub(crate) async fn send<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 1;
        loop {
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(e)
                    if (e.is_connect() || e.is_timeout())
                        && attempt < self.max_connection_attempts =>
                {
                    tracing::warn!(
                        "Connection attempt {}/{} failed: {}",
                        attempt,
                        self.max_connection_attempts,
                        e
                    );
                    attempt += 1;
                }
                Err(e) => return Err(Error::Connection(e.to_string())),
            }
        }
    }

    /// Make a GET request against the Instagram host.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = self.url(path)?;
        let headers = self.build_headers()?;

        tracing::debug!("GET {}", url);

        let response = self
            .send(|| self.client.get(url.clone()).query(query).headers(headers.clone()))
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if response.url().path().starts_with("/accounts/login") {
            return Err(Error::LoginRequired(format!(
                "redirected to login page when accessing {}",
                path
            )));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::Connection(format!(
                "HTTP 429 when accessing {}: rate limit reached",
                path
            )));
        }

        Ok(response)
    }

    /// Read a JSON body, classifying failures.
    async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = json_message(&text).unwrap_or_else(|| status.to_string());
            if is_rate_limit_message(&message) || is_rate_limit_message(&text) {
                return Err(Error::Connection(format!(
                    "HTTP {} when fetching {}: {}",
                    status.as_u16(),
                    what,
                    message
                )));
            }
            return match status.as_u16() {
                401 | 403 => Err(Error::LoginRequired(format!(
                    "HTTP {} when fetching {}: {}",
                    status.as_u16(),
                    what,
                    message
                ))),
                code if status.is_server_error() => Err(Error::Connection(format!(
                    "HTTP {} when fetching {}",
                    code, what
                ))),
                code => Err(Error::BadResponse(format!(
                    "HTTP {} when fetching {}: {}",
                    code, what, message
                ))),
            };
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            Error::BadResponse(format!(
                "Failed to parse {}: {} - Response: {}",
                what,
                e,
                text.chars().take(200).collect::<String>()
            ))
        })?;

        if value.get("status").and_then(Value::as_str) == Some("fail") {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_string();
            return Err(Error::Connection(format!("{} failed: {}", what, message)));
        }

        serde_json::from_value(value)
            .map_err(|e| Error::BadResponse(format!("Failed to parse {}: {}", what, e)))
    }

    /// Look up a profile by username.
    pub async fn get_profile(&self, username: &str) -> Result<Profile> {
        let response = self
            .get(
                "api/v1/users/web_profile_info/",
                &[("username", username.to_string())],
            )
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::ProfileNotFound(username.to_string()));
        }

        let profile: DataResponse<ProfileData> = Self::read_json(response, "profile").await?;
        let user = profile
            .data
            .and_then(|d| d.user)
            .ok_or_else(|| Error::ProfileNotFound(username.to_string()))?;

        Ok(Profile {
            id: user.id,
            username: user.username,
        })
    }

    /// Fetch one page of a user's saved media.
    pub async fn get_saved_media_page(
        &self,
        profile_id: &str,
        after: Option<&str>,
    ) -> Result<SavedMediaPage> {
        let mut variables = serde_json::json!({
            "id": profile_id,
            "first": SAVED_PAGE_SIZE,
        });
        if let Some(after) = after {
            variables["after"] = Value::String(after.to_string());
        }

        let response = self
            .get(
                "graphql/query/",
                &[
                    ("query_hash", SAVED_MEDIA_QUERY_HASH.to_string()),
                    ("variables", variables.to_string()),
                ],
            )
            .await?;

        let saved: DataResponse<SavedMediaData> =
            Self::read_json(response, "saved posts").await?;
        let page = saved
            .data
            .and_then(|d| d.user)
            .ok_or_else(|| {
                Error::LoginRequired("saved posts are not visible to this session".to_string())
            })?
            .edge_saved_media;

        tracing::debug!(
            "Saved media page: {} posts (total {:?}, more: {})",
            page.edges.len(),
            page.count,
            page.page_info.has_next_page
        );
        Ok(page)
    }

    /// Fetch the full metadata of a post.
    pub async fn get_post(&self, shortcode: &str) -> Result<MediaNode> {
        let variables = serde_json::json!({ "shortcode": shortcode });
        let response = self
            .get(
                "graphql/query/",
                &[
                    ("query_hash", POST_QUERY_HASH.to_string()),
                    ("variables", variables.to_string()),
                ],
            )
            .await?;

        let post: DataResponse<ShortcodeMediaData> = Self::read_json(response, "post").await?;
        post.data
            .and_then(|d| d.shortcode_media)
            .ok_or_else(|| {
                Error::BadResponse(format!("Fetching Post metadata failed for {}", shortcode))
            })
    }

    /// POST a form to the Instagram host and return the raw response.
    pub(crate) async fn post_form(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<(StatusCode, String)> {
        let url = self.url(path)?;
        let headers = self.build_headers()?;

        tracing::debug!("POST {}", url);

        let response = self
            .send(|| self.client.post(url.clone()).headers(headers.clone()).form(form))
            .await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::Connection(format!(
                "HTTP 429 when posting to {}: rate limit reached",
                path
            )));
        }

        let text = response.text().await?;
        Ok((status, text))
    }

    /// Load the home page to receive a CSRF token.
    pub(crate) async fn prime_csrf_token(&self) -> Result<String> {
        let url = self.base_url.clone();
        let response = self.send(|| self.client.get(url.clone())).await?;
        tracing::debug!("Home page status: {}", response.status());

        self.cookies()
            .get("csrftoken")
            .cloned()
            .ok_or_else(|| Error::Login("Instagram did not issue a CSRF token".to_string()))
    }
}

/// `message` field of a JSON error body.
fn json_message(text: &str) -> Option<String> {
    serde_json::from_str::<Value>(text)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

fn parse_cookie_header(header: &str) -> BTreeMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param, query_param_contains};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn api(server: &MockServer) -> InstagramApi {
        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        InstagramApi::with_base_url("test-agent/1.0 (integration tests)", 3, base).unwrap()
    }

    #[test]
    fn test_parse_cookie_header() {
        let cookies = parse_cookie_header("csrftoken=abc; sessionid=x%3Ay; ds_user_id=1");
        assert_eq!(cookies.get("csrftoken").map(String::as_str), Some("abc"));
        assert_eq!(cookies.get("sessionid").map(String::as_str), Some("x%3Ay"));
        assert_eq!(cookies.len(), 3);
    }

    #[tokio::test]
    async fn test_get_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/web_profile_info/"))
            .and(query_param("username", "alice"))
            .and(header("X-IG-App-ID", IG_APP_ID))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"user": {"id": "1234", "username": "alice"}},
                "status": "ok"
            })))
            .mount(&server)
            .await;

        let profile = api(&server).await.get_profile("alice").await.unwrap();
        assert_eq!(profile.id, "1234");
        assert_eq!(profile.username, "alice");
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/web_profile_info/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = api(&server).await.get_profile("ghost").await.unwrap_err();
        assert!(matches!(err, Error::ProfileNotFound(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_wait_message_is_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/graphql/query/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Please wait a few minutes before you try again.",
                "status": "fail"
            })))
            .mount(&server)
            .await;

        let err = api(&server)
            .await
            .get_saved_media_page("1234", None)
            .await
            .unwrap_err();
        assert!(err.is_rate_limit());
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_too_many_requests_is_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = api(&server).await.get_post("ABC").await.unwrap_err();
        assert!(err.is_rate_limit());
    }

    #[tokio::test]
    async fn test_status_classification() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("variables", r#"{"shortcode":"FORBIDDEN"}"#))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("variables", r#"{"shortcode":"BROKEN"}"#))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("variables", r#"{"shortcode":"GARBLED"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("variables", r#"{"shortcode":"GONE"}"#))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"shortcode_media": null}})),
            )
            .mount(&server)
            .await;

        let api = api(&server).await;
        assert!(matches!(
            api.get_post("FORBIDDEN").await,
            Err(Error::LoginRequired(_))
        ));
        assert!(matches!(api.get_post("BROKEN").await, Err(Error::Connection(_))));
        assert!(matches!(api.get_post("GARBLED").await, Err(Error::BadResponse(_))));
        let err = api.get_post("GONE").await.unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("Fetching Post metadata failed"));
    }

    #[tokio::test]
    async fn test_saved_media_page_passes_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/graphql/query/"))
            .and(query_param("query_hash", SAVED_MEDIA_QUERY_HASH))
            .and(query_param_contains("variables", r#""after":"CURSOR""#))
            .and(query_param_contains("variables", r#""first":12"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"user": {"edge_saved_media": {
                    "count": 13,
                    "page_info": {"has_next_page": false, "end_cursor": null},
                    "edges": [{"node": {"shortcode": "LAST", "__typename": "GraphImage"}}]
                }}},
                "status": "ok"
            })))
            .mount(&server)
            .await;

        let page = api(&server)
            .await
            .get_saved_media_page("1234", Some("CURSOR"))
            .await
            .unwrap();
        assert_eq!(page.edges.len(), 1);
        assert!(!page.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_restored_cookies_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/web_profile_info/"))
            .and(header("X-CSRFToken", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"user": {"id": "1", "username": "alice"}}
            })))
            .mount(&server)
            .await;

        let api = api(&server).await;
        api.add_cookie("csrftoken", "tok");
        api.add_cookie("sessionid", "sid");

        assert_eq!(api.cookies().len(), 2);
        assert!(api.get_profile("alice").await.is_ok());
    }
}
