//! Best-effort segmentation of Debian-style changelog text.
//!
//! A header line starts at column zero with a token, whitespace and a
//! parenthesized version, e.g. `hello (2.10-3) unstable; urgency=medium`.
//! Indented body lines never count as headers. Nothing else about the
//! changelog grammar is checked.

use std::sync::LazyLock;

use regex::Regex;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+\s+\(([^)]+)\)").expect("valid changelog header regex"));

/// Returns the entry for `target_version` from `full_text`.
///
/// Versions compare exactly first, then with any epoch (`N:` prefix)
/// removed from both sides. The entry runs from its header line up to the
/// next header line, or to the end of the text, and is trimmed.
///
/// When no header names the target version, the first (newest) entry is
/// returned instead. Text without any header line is returned unchanged.
///
/// ## Examples
///
/// ```
/// use merges_lib::extract_entry;
///
/// let text = "hello (1:2.0-2) unstable; urgency=medium\n\n  * Newer.\n\nhello (1:2.0-1) unstable; urgency=low\n\n  * Older.\n";
///
/// let entry = extract_entry(text, "2.0-1");
/// assert!(entry.starts_with("hello (1:2.0-1)"));
/// assert!(entry.contains("Older."));
/// assert!(!entry.contains("Newer."));
/// ```
pub fn extract_entry(full_text: &str, target_version: &str) -> String {
    let lines: Vec<&str> = full_text.split('\n').collect();

    let headers: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| header_version(line).map(|version| (index, version)))
        .collect();

    if headers.is_empty() {
        return full_text.to_string();
    }

    let block = match headers
        .iter()
        .position(|(_, version)| versions_match(version, target_version))
    {
        Some(block) => block,
        None => {
            tracing::debug!(
                target_version,
                latest = headers[0].1,
                "version not found in changelog, using latest entry"
            );
            0
        }
    };

    let start = headers[block].0;
    let end = headers
        .get(block + 1)
        .map(|(index, _)| *index)
        .unwrap_or(lines.len());

    lines[start..end].join("\n").trim().to_string()
}

/// Lists the versions named by header lines, top to bottom.
///
/// ## Examples
///
/// ```
/// use merges_lib::changelog_versions;
///
/// let text = "pkg (2.0-1) unstable; urgency=low\n  * b\npkg (1.0-1) unstable; urgency=low\n  * a\n";
/// assert_eq!(changelog_versions(text), vec!["2.0-1", "1.0-1"]);
/// ```
pub fn changelog_versions(full_text: &str) -> Vec<String> {
    full_text
        .split('\n')
        .filter_map(header_version)
        .map(String::from)
        .collect()
}

/// One extracted entry together with what the changelog offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    /// The extracted entry, as returned by [`extract_entry`].
    pub text: String,
    /// Versions named by the changelog's header lines, newest first.
    pub versions: Vec<String>,
    /// Whether a header named the requested version. When `false` and
    /// `versions` is non-empty, `text` is the newest entry instead.
    pub matched: bool,
}

impl ChangelogEntry {
    /// Extracts the entry for `target_version` and records whether it was
    /// actually present.
    ///
    /// ## Examples
    ///
    /// ```
    /// use merges_lib::changelog::ChangelogEntry;
    ///
    /// let text = "pkg (2.0-1) unstable; urgency=low\n  * b\npkg (1.0-1) unstable; urgency=low\n  * a\n";
    ///
    /// let entry = ChangelogEntry::from_changelog(text, "3.0-1");
    /// assert!(!entry.matched);
    /// assert!(entry.is_fallback());
    /// assert_eq!(entry.versions, vec!["2.0-1", "1.0-1"]);
    /// assert!(entry.text.starts_with("pkg (2.0-1)"));
    /// ```
    pub fn from_changelog(full_text: &str, target_version: &str) -> Self {
        let versions = changelog_versions(full_text);
        let matched = versions
            .iter()
            .any(|version| versions_match(version, target_version));

        Self {
            text: extract_entry(full_text, target_version),
            versions,
            matched,
        }
    }

    /// `true` when the newest entry stands in for a version the changelog
    /// does not mention.
    pub fn is_fallback(&self) -> bool {
        !self.matched && !self.versions.is_empty()
    }
}

fn header_version(line: &str) -> Option<&str> {
    HEADER_RE
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Version with any epoch removed: everything after the last `:`.
fn clean_version(version: &str) -> &str {
    version.rsplit(':').next().unwrap_or(version)
}

fn versions_match(found: &str, target: &str) -> bool {
    found == target || clean_version(found) == clean_version(target)
}
