//! Detection of error pages served in place of real content.
//!
//! Many archive mirrors answer missing files with `200 OK` and an HTML error
//! document, so a successful status alone does not mean a usable body.

use crate::constants::MIN_CONTENT_LEN;

const HTML_MARKERS: &[&str] = &["<!doctype", "<html"];

/// Returns `true` if `text` looks like genuine changelog content.
///
/// Bodies that open with an HTML document marker, or that are at most
/// [`MIN_CONTENT_LEN`] characters once trimmed, are rejected.
///
/// ## Examples
///
/// ```
/// use merges_lib::looks_like_valid_content;
///
/// assert!(!looks_like_valid_content("<!DOCTYPE html><html>Not Found</html>"));
/// assert!(!looks_like_valid_content("short"));
/// assert!(looks_like_valid_content(&"A".repeat(100)));
/// ```
pub fn looks_like_valid_content(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();

    if HTML_MARKERS.iter().any(|marker| normalized.starts_with(marker)) {
        return false;
    }

    normalized.chars().count() > MIN_CONTENT_LEN
}
