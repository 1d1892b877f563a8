//! Session file storage.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::fs::paths::ensure_parent_dir;
use crate::session::Session;

/// Load a session from a JSON file.
pub fn load_session(path: &Path) -> Result<Session> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Session file {} is not readable ({}). Delete it to log in again.",
            path.display(),
            e
        ))
    })
}

/// Save a session to a JSON file.
pub fn save_session(session: &Session, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let content = serde_json::to_string_pretty(session)?;
    fs::write(path, content)?;
    tracing::debug!("Saved session to {}", path.display());
    Ok(())
}

/// Build a session from a Netscape-format cookies.txt browser export.
///
/// Only `instagram.com` cookies are kept; a `sessionid` cookie is required.
pub fn import_cookies_txt(path: &Path, username: &str) -> Result<Session> {
    let content = fs::read_to_string(path)?;
    let cookies = parse_cookies_txt(&content);

    if !cookies.contains_key("sessionid") {
        return Err(Error::Config(format!(
            "{} has no Instagram sessionid cookie. Log in to instagram.com in the browser before exporting cookies.",
            path.display()
        )));
    }

    tracing::info!("Imported {} cookies from {}", cookies.len(), path.display());
    Ok(Session::new(username, cookies))
}

fn parse_cookies_txt(content: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for line in content.lines() {
        // HttpOnly cookies are written with this prefix instead of as comments
        let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 7 {
            continue;
        }
        let domain = fields[0].trim_start_matches('.');
        if domain != "instagram.com" && !domain.ends_with(".instagram.com") {
            continue;
        }
        cookies.insert(fields[5].to_string(), fields[6].trim_end().to_string());
    }
    cookies
}
