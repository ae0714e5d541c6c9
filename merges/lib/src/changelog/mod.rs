//! Changelog location and entry extraction.
//!
//! Debian-style changelogs carry every historical entry in one file. For a
//! merge we only want the entry for one version on one side of the merge.
//!
//! ## Module Structure
//!
//! - [`extract`]: Segments changelog text into entries and picks one by version
//! - [`locate`]: Builds candidate URLs and external links for a record's changelog

pub mod extract;
pub mod locate;

pub use extract::{ChangelogEntry, changelog_versions, extract_entry};
pub use locate::{ChangelogSide, VersionEncoding, changelog_candidates, external_link};
