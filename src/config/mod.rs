//! Configuration module for ig-saved-export.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Post filter selection
//! - Configuration validation and environment value parsing

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{AccountConfig, Config, OptionsConfig, RetryConfig};
pub use modes::PostFilter;
pub use validation::{
    looks_like_email, parse_max_posts, parse_sleep_seconds, parse_truthy, validate_config,
};
