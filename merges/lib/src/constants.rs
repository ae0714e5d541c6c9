//! Sentinel values and field-name candidates shared across the normalizer.
//!
//! Candidate lists are matched against lower-cased keys, first present wins.

/// Placeholder for a name or submitter that could not be resolved.
pub const UNKNOWN: &str = "Unknown";

/// Placeholder for a version or age that upstream did not report.
pub const NOT_APPLICABLE: &str = "N/A";

/// How many original key names the diagnostic placeholder name embeds.
pub const DIAGNOSTIC_KEY_SAMPLE: usize = 5;

/// Bodies at or below this many characters are treated as placeholders.
pub const MIN_CONTENT_LEN: usize = 50;

pub const NAME_KEYS: &[&str] = &["source_package", "source", "package", "name", "pkg", "src"];

pub const PRIMARY_VERSION_KEYS: &[&str] = &[
    "left_version",
    "version_ubuntu",
    "ubuntu_version",
    "ubuntu",
    "version",
];

pub const REFERENCE_VERSION_KEYS: &[&str] = &[
    "right_version",
    "version_debian",
    "debian_version",
    "debian",
    "new_version",
];

pub const SUBMITTER_KEYS: &[&str] = &["uploader", "user", "changed_by"];

pub const GROUPS_KEY: &str = "teams";

pub const AGE_KEY: &str = "age";
