//! Base64 artifact writer.
//!
//! The artifact is the standard-alphabet Base64 of the serialized merged
//! feed, on a single line with no trailing newline. Every run overwrites it.

use crate::error::WriteError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Encode serialized feed text as standard Base64, without line breaks.
pub fn encode_artifact(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Encode `text` and write it to `output_dir/file_name`, replacing any
/// previous artifact.
///
/// # Returns
///
/// The written path and the length of the encoded artifact.
///
/// # Errors
///
/// [`WriteError::Io`] if the file cannot be written.
#[instrument(level = "info", skip(text), fields(output_dir = %output_dir.display()))]
pub async fn write_artifact(
    output_dir: &Path,
    file_name: &str,
    text: &str,
) -> Result<(PathBuf, usize), WriteError> {
    let encoded = encode_artifact(text);
    let path = output_dir.join(file_name);

    fs::write(&path, encoded.as_bytes())
        .await
        .map_err(|source| WriteError::Io {
            path: path.display().to_string(),
            source,
        })?;
    info!(path = %path.display(), chars = encoded.len(), "Wrote artifact");

    Ok((path, encoded.len()))
}
