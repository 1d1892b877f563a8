//! Filename generation from user-supplied names.

use crate::error::{Error, Result};

/// Sanitize a username for use inside a filename.
///
/// Path separators and characters that are invalid on common filesystems
/// are replaced; traversal patterns and null bytes are rejected.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::ConfigValidation {
            field: "username".to_string(),
            message: format!("Path traversal detected: '{}'", name),
        });
    }

    if name.contains('\0') {
        return Err(Error::ConfigValidation {
            field: "username".to_string(),
            message: format!("Null bytes not allowed: '{}'", name),
        });
    }

    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return Err(Error::ConfigValidation {
            field: "username".to_string(),
            message: "Name cannot be empty or whitespace-only".to_string(),
        });
    }

    Ok(sanitized)
}
