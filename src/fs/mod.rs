//! Filesystem module.
//!
//! Provides:
//! - Default session and output file locations
//! - Filename sanitizing for user-supplied names

pub mod naming;
pub mod paths;

pub use naming::sanitize_path_component;
pub use paths::{default_output_path, default_session_path, ensure_parent_dir};
