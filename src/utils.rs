//! Utility functions for number normalization, log formatting, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Parsing of the site's dot-grouped numbers (`"1.234.567"`)
//! - String truncation for log fields
//! - File system validation for output directories

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{debug, info, instrument};

/// What a caller wants back when a cell holds no number (`"-"`, blank, text).
///
/// Processing tables report missing quantities as `null`; the trade tables
/// (import and export) report them as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoValue {
    Null,
    Zero,
}

/// Parse a dot-grouped integer such as `"139.320.884"`.
///
/// Grouping dots are removed and surrounding whitespace trimmed. The result is
/// `None` unless what remains is a non-empty run of ASCII digits that fits in
/// an `i64`. This never fails: `"-"`, `""` and any other text yield `None`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_grouped_number("1.234.567"), Some(1234567));
/// assert_eq!(parse_grouped_number("-"), None);
/// ```
pub fn parse_grouped_number(text: &str) -> Option<i64> {
    let stripped = text.replace('.', "");
    let digits = stripped.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// [`parse_grouped_number`] with the caller's missing-value convention applied.
pub fn normalize_number(text: &str, policy: NoValue) -> Option<i64> {
    match (parse_grouped_number(text), policy) {
        (Some(n), _) => Some(n),
        (None, NoValue::Null) => None,
        (None, NoValue::Zero) => Some(0),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backing off to a char
/// boundary) with an ellipsis and byte count indicator appended.
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
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            if let Err(e) = stdfs::remove_file(&probe_path) {
                debug!(%probe_path, error = %e, "Could not remove write probe");
            }
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
