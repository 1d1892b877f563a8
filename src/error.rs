//! Error types for the ig-saved-export application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Authentication errors
    #[error("Bad credentials: {0}")]
    BadCredentials(String),

    #[error("Two-factor authentication required")]
    TwoFactorRequired { identifier: String },

    #[error("Login failed: {0}")]
    Login(String),

    #[error("Login required: {0}")]
    LoginRequired(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    // Platform errors
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Bad response: {0}")]
    BadResponse(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    // Run-aborting fetch errors
    #[error(
        "Instagram is rate limiting this account ({0}). Wait 15-30 minutes before running again, \
         or raise IG_SLEEP to space out requests."
    )]
    RateLimited(String),

    #[error(
        "Could not access saved posts ({0}). Make sure the session is logged in to your own account."
    )]
    NotAuthorized(String),

    #[error("Network error during extraction: {0}")]
    Extraction(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Process exit code for a run that failed with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::ConfigValidation { .. }
            | Self::MissingConfig(_)
            | Self::TomlParse(_)
            | Self::UrlParse(_) => exit_codes::CONFIG_ERROR,
            Self::BadCredentials(_)
            | Self::TwoFactorRequired { .. }
            | Self::Login(_)
            | Self::Prompt(_) => exit_codes::AUTH_ERROR,
            Self::LoginRequired(_)
            | Self::NotAuthorized(_)
            | Self::RateLimited(_)
            | Self::Extraction(_)
            | Self::Connection(_)
            | Self::BadResponse(_)
            | Self::ProfileNotFound(_)
            | Self::Http(_) => exit_codes::FETCH_ERROR,
            Self::Io(_) | Self::Csv(_) => exit_codes::EXPORT_ERROR,
            Self::Json(_) => exit_codes::UNEXPECTED_ERROR,
        }
    }

    /// Whether the error is a bad or partial response or a connectivity
    /// problem that may succeed when retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::BadResponse(_) | Error::Http(_)
        )
    }

    /// Whether the error message reads like an Instagram rate-limit response.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Error::RateLimited(_) => true,
            other => is_rate_limit_message(&other.to_string()),
        }
    }

    /// Whether a failed login attempt should fall back to the interactive flow.
    pub fn allows_interactive_login(&self) -> bool {
        matches!(
            self,
            Error::BadCredentials(_) | Error::TwoFactorRequired { .. } | Error::Login(_)
        )
    }
}

/// Classify an error message as a rate-limit response.
///
/// Instagram does not return a stable error code for throttling, so this
/// matches on message text. Any wording change upstream breaks it.
pub fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("rate limit") || lower.contains("please wait a few minutes")
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED_ERROR: i32 = 1;
    pub const AUTH_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const FETCH_ERROR: i32 = 4;
    pub const EXPORT_ERROR: i32 = 5;
}
