//! Default file locations and directory management.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::naming::sanitize_path_component;

/// Default session file for a user: `<username>.session`.
pub fn default_session_path(username: &str) -> Result<PathBuf> {
    let name = sanitize_path_component(username)?;
    Ok(PathBuf::from(format!("{}.session", name)))
}

/// Default CSV output file for a user: `saved_posts_<username>.csv`.
pub fn default_output_path(username: &str) -> Result<PathBuf> {
    let name = sanitize_path_component(username)?;
    Ok(PathBuf::from(format!("saved_posts_{}.csv", name)))
}

/// Ensure the parent directory of a file exists, creating it if necessary.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
