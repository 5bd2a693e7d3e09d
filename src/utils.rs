//! Small helpers for log formatting and output directory checks.

use crate::error::WriteError;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes, on a char boundary, with an
/// ellipsis and a count of the dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then creates and immediately
/// deletes a scratch file.
///
/// # Errors
///
/// [`WriteError::NotWritable`] if the directory cannot be created or written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), WriteError> {
    let not_writable = |source| WriteError::NotWritable {
        path: path.display().to_string(),
        source,
    };
    fs::create_dir_all(path).await.map_err(not_writable)?;
    // A file must be creatable, not just the directory listable.
    let scratch_path = path.join(".subfeed_write_check");
    stdfs::File::create(&scratch_path).map_err(not_writable)?;
    let _ = stdfs::remove_file(&scratch_path);
    info!("Output directory is writable");
    Ok(())
}
