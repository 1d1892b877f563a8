//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{parse_max_posts, parse_sleep_seconds, parse_truthy, Config, PostFilter};

/// Instagram saved-posts exporter CLI.
#[derive(Parser, Debug)]
#[command(
    name = "ig-saved-export",
    version,
    about = "Export your saved Instagram posts to CSV",
    long_about = "Logs in to Instagram (or reuses a saved session), walks the posts saved by \
                  the account and writes one CSV row per post.\n\n\
                  Every option can also be given through its IG_* environment variable."
)]
pub struct Args {
    /// Instagram username (not the email address).
    #[arg(short, long, env = "IG_USERNAME")]
    pub username: Option<String>,

    /// Password, only needed when no session file exists yet.
    #[arg(short, long, env = "IG_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Session file [default: <username>.session].
    #[arg(long = "session-file", env = "IG_SESSIONFILE")]
    pub session_file: Option<PathBuf>,

    /// CSV output path [default: saved_posts_<username>.csv].
    #[arg(short, long, env = "IG_CSV")]
    pub output: Option<PathBuf>,

    /// Seconds to sleep after each post (fractions allowed) [default: 3].
    #[arg(long, env = "IG_SLEEP", value_parser = parse_sleep_seconds)]
    pub sleep: Option<f64>,

    /// Maximum number of rows; empty, "none" or invalid means no limit.
    #[arg(long, env = "IG_MAX")]
    pub max: Option<String>,

    /// User agent sent with every request.
    #[arg(short = 'a', long = "user-agent", env = "IG_UA")]
    pub user_agent: Option<String>,

    /// Only export video posts.
    #[arg(
        long = "videos-only",
        env = "IG_VIDEOS_ONLY",
        value_parser = parse_toggle,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub videos_only: Option<bool>,

    /// Two-factor code to answer the first code prompt with.
    #[arg(long = "two-factor-code", env = "IG_2FA_CODE", hide_env_values = true)]
    pub two_factor_code: Option<String>,

    /// Netscape cookies.txt exported from a logged-in browser, imported as the session.
    #[arg(long = "load-cookies", env = "IG_COOKIES")]
    pub load_cookies: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "saved-posts.toml")]
    pub config: PathBuf,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

fn parse_toggle(value: &str) -> Result<bool, String> {
    Ok(parse_truthy(value))
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        // Account settings
        if let Some(username) = self.username {
            config.account.username = Some(username);
        }

        if self.password.is_some() {
            config.account.password = self.password;
        }

        if self.two_factor_code.is_some() {
            config.account.two_factor_code = self.two_factor_code;
        }

        if let Some(session_file) = self.session_file {
            config.account.session_file = Some(session_file);
        }

        if let Some(user_agent) = self.user_agent {
            config.account.user_agent = user_agent;
        }

        // Export options
        if let Some(output) = self.output {
            config.options.output = Some(output);
        }

        if let Some(sleep) = self.sleep {
            config.options.sleep_seconds = sleep;
        }

        if let Some(max) = self.max {
            config.options.max_posts = parse_max_posts(&max);
        }

        if let Some(videos_only) = self.videos_only {
            config.options.filter = PostFilter::from_videos_only(videos_only);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("ig-saved-export").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        config.options.max_posts = Some(50);

        parse(&[
            "-u",
            "alice",
            "--sleep",
            "0.5",
            "--max",
            "10",
            "--videos-only",
            "-o",
            "out/alice.csv",
        ])
        .merge_into_config(&mut config);

        assert_eq!(config.account.username.as_deref(), Some("alice"));
        assert_eq!(config.options.sleep_seconds, 0.5);
        assert_eq!(config.options.max_posts, Some(10));
        assert_eq!(config.options.filter, PostFilter::Videos);
        assert_eq!(config.output_path().unwrap(), PathBuf::from("out/alice.csv"));
    }

    #[test]
    fn test_invalid_max_means_unlimited() {
        let mut config = Config::default();
        config.options.max_posts = Some(50);

        parse(&["--max", "lots"]).merge_into_config(&mut config);
        assert_eq!(config.options.max_posts, None);
    }

    #[test]
    fn test_videos_only_toggle_values() {
        let mut config = Config::default();
        parse(&["--videos-only", "no"]).merge_into_config(&mut config);
        assert_eq!(config.options.filter, PostFilter::All);

        parse(&["--videos-only", "YES"]).merge_into_config(&mut config);
        assert_eq!(config.options.filter, PostFilter::Videos);
    }

    #[test]
    fn test_negative_sleep_is_rejected() {
        let result = Args::try_parse_from(["ig-saved-export", "--sleep=-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let mut config = Config::default();
        config.options.sleep_seconds = 7.0;
        config.options.filter = PostFilter::Videos;

        parse(&[]).merge_into_config(&mut config);

        assert_eq!(config.options.sleep_seconds, 7.0);
        assert_eq!(config.options.filter, PostFilter::Videos);
    }
}
