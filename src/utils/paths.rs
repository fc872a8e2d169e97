use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use percent_encoding::percent_decode_str;

// Maximum size for a session file: 50MB. Agent transcripts run large, but
// anything past this is more likely a runaway log than a session.
const MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Decodes Claude's encoded project directory name back to a file system path.
///
/// Claude stores each project's sessions under a directory named after the
/// project path: a leading hyphen, then the percent-encoded path without its
/// leading slash.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use session_replay::utils::decode_project_dir;
///
/// let encoded = "-Users%2Ffoo%2Fbar";
/// assert_eq!(decode_project_dir(encoded), PathBuf::from("/Users/foo/bar"));
/// ```
pub fn decode_project_dir(encoded: &str) -> PathBuf {
    let without_prefix = encoded.strip_prefix('-').unwrap_or(encoded);

    // Percent-decode the string (avoiding double allocation)
    let decoded = percent_decode_str(without_prefix).decode_utf8_lossy();
    let decoded_str = match decoded {
        Cow::Borrowed(s) => s,
        Cow::Owned(ref s) => s.as_str(),
    };

    PathBuf::from(format!("/{}", decoded_str))
}

/// Validates that a session file's size is within acceptable limits (50MB)
///
/// Takes an open file handle to avoid TOCTOU (time-of-check-time-of-use)
/// race conditions where the file could be modified between the size check
/// and subsequent file operations.
///
/// # Errors
///
/// Returns an error if:
/// - The file metadata cannot be read
/// - The file is larger than 50MB
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(())
}
