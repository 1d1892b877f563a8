//! Instagram API module.
//!
//! This module provides:
//! - HTTP client for the Instagram web API
//! - Password and two-factor login
//! - Lazily loaded posts and the saved-posts cursor
//! - API response types

pub mod auth;
pub mod client;
pub mod post;
pub mod saved;
pub mod types;

pub use client::{InstagramApi, SAVED_PAGE_SIZE};
pub use post::InstagramPost;
pub use saved::SavedPostsCursor;
pub use types::*;
