//! Configuration structures and loading logic.

use crate::config::modes::PostFilter;
use crate::error::{Error, Result};
use crate::fetch::{ExtractOptions, RetryPolicy};
use crate::fs::paths::{default_output_path, default_session_path};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

/// Account and session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Instagram username (not the email address).
    #[serde(default)]
    pub username: Option<String>,

    /// Password, only ever taken from the CLI or environment.
    #[serde(skip)]
    pub password: Option<String>,

    /// Scripted two-factor code for headless runs.
    #[serde(skip)]
    pub two_factor_code: Option<String>,

    /// Session file path. Defaults to `<username>.session`.
    #[serde(default)]
    pub session_file: Option<PathBuf>,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Export options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// CSV output path. Defaults to `saved_posts_<username>.csv`.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Seconds to sleep after each processed post.
    #[serde(default = "default_sleep_seconds")]
    pub sleep_seconds: f64,

    /// Maximum number of exported rows (unset = no limit).
    #[serde(default)]
    pub max_posts: Option<usize>,

    /// Which posts to export.
    #[serde(default)]
    pub filter: PostFilter,

    /// Immediate resends of a request on connection failures.
    #[serde(default = "default_max_connection_attempts")]
    pub max_connection_attempts: u32,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            output: None,
            sleep_seconds: default_sleep_seconds(),
            max_posts: None,
            filter: PostFilter::default(),
            max_connection_attempts: default_max_connection_attempts(),
        }
    }
}

/// Retry schedules, as delays in seconds before each attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Schedule for the request that opens the saved-posts collection.
    #[serde(default = "default_pagination_delays")]
    pub pagination_delays_secs: Vec<u64>,

    /// Schedule for extracting a single post's metadata.
    #[serde(default = "default_post_delays")]
    pub post_delays_secs: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            pagination_delays_secs: default_pagination_delays(),
            post_delays_secs: default_post_delays(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1".to_string()
}

fn default_sleep_seconds() -> f64 {
    3.0
}

fn default_max_connection_attempts() -> u32 {
    3
}

fn default_pagination_delays() -> Vec<u64> {
    vec![0, 300, 600]
}

fn default_post_delays() -> Vec<u64> {
    vec![0, 60, 120]
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            two_factor_code: None,
            session_file: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Strip surrounding whitespace and a leading `@` from the username,
    /// so the login, session file and CSV path all use the same name.
    pub fn normalize_username(&mut self) {
        if let Some(username) = &mut self.account.username {
            *username = username.trim().trim_start_matches('@').to_string();
        }
    }

    /// The configured username, or an error if none was given.
    pub fn username(&self) -> Result<&str> {
        self.account
            .username
            .as_deref()
            .ok_or_else(|| Error::MissingConfig("username (set IG_USERNAME)".to_string()))
    }

    /// Get the effective session file path.
    pub fn session_file(&self) -> Result<PathBuf> {
        match &self.account.session_file {
            Some(path) => Ok(path.clone()),
            None => default_session_path(self.username()?),
        }
    }

    /// Get the effective CSV output path.
    pub fn output_path(&self) -> Result<PathBuf> {
        match &self.options.output {
            Some(path) => Ok(path.clone()),
            None => default_output_path(self.username()?),
        }
    }

    /// Delay applied after each processed post.
    pub fn inter_request_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.options.sleep_seconds.max(0.0))
            .unwrap_or(Duration::MAX)
    }

    /// Retry schedule for opening the saved-posts collection.
    pub fn pagination_policy(&self) -> RetryPolicy {
        RetryPolicy::from_secs(&self.retry.pagination_delays_secs)
    }

    /// Options for the extraction loop.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            filter: self.options.filter,
            limit: self.options.max_posts,
            inter_request_delay: self.inter_request_delay(),
            retry: RetryPolicy::from_secs(&self.retry.post_delays_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.options.sleep_seconds, 3.0);
        assert_eq!(config.options.max_posts, None);
        assert_eq!(config.options.filter, PostFilter::All);
        assert_eq!(config.options.max_connection_attempts, 3);
        assert_eq!(config.retry.pagination_delays_secs, vec![0, 300, 600]);
        assert_eq!(config.retry.post_delays_secs, vec![0, 60, 120]);
        assert!(config.account.user_agent.contains("iPhone"));
    }

    #[test]
    fn test_default_paths_follow_username() {
        let mut config = Config::default();
        assert!(config.session_file().is_err());

        config.account.username = Some("alice".to_string());
        assert_eq!(config.session_file().unwrap(), PathBuf::from("alice.session"));
        assert_eq!(
            config.output_path().unwrap(),
            PathBuf::from("saved_posts_alice.csv")
        );

        config.options.output = Some(PathBuf::from("out/posts.csv"));
        assert_eq!(config.output_path().unwrap(), PathBuf::from("out/posts.csv"));
    }

    #[test]
    fn test_normalized_username_drives_default_paths() {
        let mut config = Config::default();
        config.account.username = Some(" @alice ".to_string());
        config.normalize_username();

        assert_eq!(config.username().unwrap(), "alice");
        assert_eq!(config.session_file().unwrap(), PathBuf::from("alice.session"));
        assert_eq!(
            config.output_path().unwrap(),
            PathBuf::from("saved_posts_alice.csv")
        );
    }

    #[test]
    fn test_inter_request_delay_saturates() {
        let mut config = Config::default();
        config.options.sleep_seconds = 1e300;
        assert_eq!(config.inter_request_delay(), Duration::MAX);
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[account]\nusername = \"alice\"\n\n[options]\nmax_posts = 10\nfilter = \"videos\"\n\n[retry]\npost_delays_secs = [0, 5]"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.account.username.as_deref(), Some("alice"));
        assert_eq!(config.options.max_posts, Some(10));
        assert_eq!(config.options.filter, PostFilter::Videos);
        assert_eq!(config.options.sleep_seconds, 3.0);
        assert_eq!(config.retry.post_delays_secs, vec![0, 5]);
        assert_eq!(config.retry.pagination_delays_secs, vec![0, 300, 600]);
    }

    #[test]
    fn test_password_never_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[account]\nusername = \"alice\"\npassword = \"hunter2\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.account.password, None);
    }

    #[test]
    fn test_extract_options() {
        let mut config = Config::default();
        config.options.sleep_seconds = 0.5;
        config.options.max_posts = Some(4);

        let options = config.extract_options();
        assert_eq!(options.inter_request_delay, Duration::from_millis(500));
        assert_eq!(options.limit, Some(4));
        assert_eq!(options.retry.attempts(), 3);
    }
}
