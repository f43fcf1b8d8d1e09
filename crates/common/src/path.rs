//! Remote path validation.
//!
//! Remote paths arrive from callers relative to the share's base path and
//! must stay inside it. Validation happens before the bridge goes anywhere
//! near a mount, so a bad path never costs a mount cycle.

use crate::error::BridgeError;

/// Validate and normalize a caller-supplied remote path.
///
/// Rejects empty and absolute paths, traversal segments, and characters SMB
/// filenames cannot carry. Returns the path with redundant separators and
/// `.` segments removed, joined with `/`.
pub fn validate_remote_path(path: &str) -> Result<String, BridgeError> {
    let fail = |reason: &'static str| BridgeError::Validation {
        path: path.to_string(),
        reason,
    };

    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(fail("empty path"));
    }
    if trimmed.starts_with('/') || trimmed.starts_with('\\') {
        return Err(fail("absolute path"));
    }
    if trimmed.contains('\0') || trimmed.contains(':') {
        return Err(fail("illegal character"));
    }

    let mut segments = Vec::new();
    for segment in trimmed.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(fail("path traversal segment")),
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(fail("empty path"));
    }
    Ok(segments.join("/"))
}
