use crate::error::{BrowserError, Result};

/// Longest folder name accepted, in bytes.
pub const MAX_FOLDER_NAME_BYTES: usize = 255;

const FORBIDDEN_CHARS: &[char] = &['/', '\\', '<', '>', ':', '"', '|', '?', '*'];

/// Check a folder name before it is sent to the service.
///
/// Returns the trimmed name on success.
pub fn validate_folder_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(BrowserError::Validation("Folder name cannot be empty".into()));
    }
    if name == "." || name == ".." {
        return Err(BrowserError::Validation(format!(
            "'{}' is not a valid folder name",
            name
        )));
    }
    if name.len() > MAX_FOLDER_NAME_BYTES {
        return Err(BrowserError::Validation(format!(
            "Folder name is longer than {} bytes",
            MAX_FOLDER_NAME_BYTES
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control())
    {
        return Err(BrowserError::Validation(format!(
            "Folder name cannot contain {:?}",
            c
        )));
    }
    Ok(name.to_string())
}
