//! Configuration validation and environment value parsing.

use crate::config::loader::Config;
use crate::error::{Error, Result};
use regex::Regex;
use std::time::Duration;

/// Maximum Instagram username length.
const MAX_USERNAME_LENGTH: usize = 30;

/// Minimum length for user agent.
const MIN_USER_AGENT_LENGTH: usize = 20;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_username(config.username()?)?;
    validate_user_agent(&config.account.user_agent)?;
    validate_sleep(config.options.sleep_seconds)?;
    validate_delays("pagination_delays_secs", &config.retry.pagination_delays_secs)?;
    validate_delays("post_delays_secs", &config.retry.post_delays_secs)?;

    if config.options.max_connection_attempts == 0 {
        return Err(Error::ConfigValidation {
            field: "max_connection_attempts".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    Ok(())
}

/// Check whether a login name looks like an email address.
pub fn looks_like_email(username: &str) -> bool {
    let email_pattern = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    email_pattern.is_match(username.trim())
}

/// Validate the Instagram username.
///
/// Email addresses pass with a warning; the login step reports the
/// mistake if Instagram rejects them.
pub fn validate_username(username: &str) -> Result<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(Error::MissingConfig("username".to_string()));
    }

    if looks_like_email(username) {
        tracing::warn!(
            "Username '{}' looks like an email address. Instagram expects the USERNAME.",
            username
        );
        return Ok(());
    }

    let clean_username = username.trim_start_matches('@');

    if clean_username.len() > MAX_USERNAME_LENGTH {
        return Err(Error::ConfigValidation {
            field: "username".to_string(),
            message: format!(
                "Username '{}' is too long (maximum {} characters)",
                username, MAX_USERNAME_LENGTH
            ),
        });
    }

    // Letters, digits, periods and underscores only
    let username_pattern = Regex::new(r"^[A-Za-z0-9._]+$").unwrap();
    if !username_pattern.is_match(clean_username) {
        return Err(Error::ConfigValidation {
            field: "username".to_string(),
            message: format!(
                "Username '{}' contains invalid characters. Only letters, digits, periods and underscores allowed.",
                username
            ),
        });
    }

    Ok(())
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.trim().is_empty() {
        return Err(Error::MissingConfig("user_agent".to_string()));
    }

    if user_agent.len() < MIN_USER_AGENT_LENGTH {
        return Err(Error::ConfigValidation {
            field: "user_agent".to_string(),
            message: format!(
                "User agent must be at least {} characters (got {})",
                MIN_USER_AGENT_LENGTH,
                user_agent.len()
            ),
        });
    }

    Ok(())
}

/// Validate the inter-request sleep.
pub fn validate_sleep(seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(Error::ConfigValidation {
            field: "sleep".to_string(),
            message: format!("Sleep must be a non-negative number of seconds (got {})", seconds),
        });
    }
    if Duration::try_from_secs_f64(seconds).is_err() {
        return Err(Error::ConfigValidation {
            field: "sleep".to_string(),
            message: format!("Sleep of {} seconds is too long", seconds),
        });
    }
    Ok(())
}

fn validate_delays(field: &str, delays: &[u64]) -> Result<()> {
    if delays.is_empty() {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "At least one attempt is required".to_string(),
        });
    }
    Ok(())
}

/// Parse a boolean toggle from the environment.
///
/// `1`, `true`, `yes` and `on` (any case) are true; everything else is false.
pub fn parse_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse the maximum post count.
///
/// Empty, `none` and unparsable values mean "no limit".
pub fn parse_max_posts(value: &str) -> Option<usize> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return None;
    }
    value.parse().ok()
}

/// Parse the inter-request sleep in seconds.
pub fn parse_sleep_seconds(value: &str) -> std::result::Result<f64, String> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    validate_sleep(seconds).map_err(|e| e.to_string())?;
    Ok(seconds)
}
