//! Upload validation
//!
//! Checks a candidate upload's extension and size before any network activity.
//! Pure function of (name, size); no side effects.

use thiserror::Error;

/// Accepted file extensions (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".wav", ".mp3", ".mp4"];

/// Largest accepted upload: 25 MiB
pub const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// Reason an upload was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a .wav, .mp3, or .mp4 file")]
    UnsupportedExtension { file_name: String },

    #[error("File size must be less than 25MB")]
    TooLarge { size: u64 },
}

/// Accept `file_name`/`size` or return the human-readable reason for rejecting it
pub fn validate_upload(file_name: &str, size: u64) -> Result<(), ValidationError> {
    let lowered = file_name.to_lowercase();
    if !ALLOWED_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
        return Err(ValidationError::UnsupportedExtension {
            file_name: file_name.to_string(),
        });
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge { size });
    }
    Ok(())
}
