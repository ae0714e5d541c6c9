//! Candidate URLs for a record's changelog.
//!
//! Archive mirrors disagree on how a version with an epoch appears in a path:
//! some keep the colon, some percent-encode it, some drop the epoch. Each
//! [`VersionEncoding`] yields one candidate and callers try them in order.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::config::MergesConfig;
use crate::constants::NOT_APPLICABLE;
use crate::types::MergeRecord;

/// Which side of a merge a changelog belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ChangelogSide {
    /// The Ubuntu side, at the record's primary version.
    Primary,
    /// The Debian side, at the record's reference version.
    Reference,
}

impl ChangelogSide {
    /// The version of `record` this side refers to.
    pub fn version_of(self, record: &MergeRecord) -> &str {
        match self {
            Self::Primary => &record.primary_version,
            Self::Reference => &record.reference_version,
        }
    }

    /// Human-readable distribution name for this side.
    pub fn distribution(self) -> &'static str {
        match self {
            Self::Primary => "Ubuntu",
            Self::Reference => "Debian",
        }
    }
}

/// How a version string is written into a changelog URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum VersionEncoding {
    /// The version exactly as reported.
    Raw,
    /// Colons written as `%3A`.
    EncodedColon,
    /// Everything up to and including the last colon removed.
    EpochStripped,
}

impl VersionEncoding {
    /// Writes `version` in this encoding.
    ///
    /// ## Examples
    ///
    /// ```
    /// use merges_lib::VersionEncoding;
    ///
    /// assert_eq!(VersionEncoding::Raw.apply("1:2.0-1"), "1:2.0-1");
    /// assert_eq!(VersionEncoding::EncodedColon.apply("1:2.0-1"), "1%3A2.0-1");
    /// assert_eq!(VersionEncoding::EpochStripped.apply("1:2.0-1"), "2.0-1");
    /// ```
    pub fn apply(self, version: &str) -> String {
        match self {
            Self::Raw => version.to_string(),
            Self::EncodedColon => version.replace(':', "%3A"),
            Self::EpochStripped => version
                .rsplit(':')
                .next()
                .unwrap_or(version)
                .to_string(),
        }
    }
}

/// Candidate changelog URLs for one side of `record`, one per
/// [`VersionEncoding`], with duplicates removed.
///
/// Empty when the side has no version or the name is not a package name
/// (for example a diagnostic placeholder).
///
/// ## Examples
///
/// ```
/// use chrono::Utc;
/// use merges_lib::changelog::changelog_candidates;
/// use merges_lib::{normalize_with, ChangelogSide, Classification, MergesConfig, NoopSink};
/// use serde_json::json;
///
/// let records = normalize_with(
///     &json!([["libfoo", "1:2.0-1ubuntu1", "1:2.0-2"]]),
///     Classification::Main,
///     &NoopSink,
///     Utc::now(),
/// );
/// let urls = changelog_candidates(&records[0], ChangelogSide::Reference, &MergesConfig::default());
/// assert_eq!(urls.len(), 3);
/// assert_eq!(
///     urls[2],
///     "https://metadata.ftp-master.debian.org/changelogs/main/libf/libfoo/libfoo_2.0-2_changelog"
/// );
/// ```
pub fn changelog_candidates(
    record: &MergeRecord,
    side: ChangelogSide,
    config: &MergesConfig,
) -> Vec<String> {
    let version = side.version_of(record);
    if version.is_empty() || version == NOT_APPLICABLE || !is_package_name(&record.name) {
        return Vec::new();
    }

    let name = &record.name;
    let prefix = pool_prefix(name);
    let mut urls: Vec<String> = Vec::new();

    for encoding in VersionEncoding::iter() {
        let encoded = encoding.apply(version);
        let url = match side {
            ChangelogSide::Primary => format!(
                "{}{}/{prefix}/{name}/{name}_{encoded}/changelog",
                config.ubuntu_changelog_base_url,
                record.classification.report_slug(),
            ),
            ChangelogSide::Reference => format!(
                "{}main/{prefix}/{name}/{name}_{encoded}_changelog",
                config.debian_changelog_base_url,
            ),
        };
        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    urls
}

/// Link to view a side of `record` on the distribution's own site, shown
/// when its changelog cannot be retrieved.
///
/// ## Examples
///
/// ```
/// use chrono::Utc;
/// use merges_lib::changelog::external_link;
/// use merges_lib::{normalize_with, ChangelogSide, Classification, MergesConfig, NoopSink};
/// use serde_json::json;
///
/// let records = normalize_with(&json!([["hello", "2.10-3ubuntu1", "2.10-3"]]), Classification::Main, &NoopSink, Utc::now());
/// let config = MergesConfig::default();
///
/// assert_eq!(
///     external_link(&records[0], ChangelogSide::Primary, &config),
///     "https://launchpad.net/ubuntu/+source/hello/2.10-3ubuntu1"
/// );
/// assert_eq!(
///     external_link(&records[0], ChangelogSide::Reference, &config),
///     "https://tracker.debian.org/pkg/hello"
/// );
/// ```
pub fn external_link(record: &MergeRecord, side: ChangelogSide, config: &MergesConfig) -> String {
    match side {
        ChangelogSide::Primary => {
            let version = side.version_of(record);
            if version.is_empty() || version == NOT_APPLICABLE {
                format!("{}{}", config.launchpad_base_url, record.name)
            } else {
                format!("{}{}/{}", config.launchpad_base_url, record.name, version)
            }
        }
        ChangelogSide::Reference => format!("{}{}", config.debian_tracker_base_url, record.name),
    }
}

/// Archive pool directory: `lib` plus the next character for library
/// packages, otherwise the first character.
fn pool_prefix(name: &str) -> String {
    if name.starts_with("lib") && name.chars().count() > 3 {
        name.chars().take(4).collect()
    } else {
        name.chars().take(1).collect()
    }
}

fn is_package_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
}
