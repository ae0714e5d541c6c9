//! Normalization and changelog extraction for pending package merges.
//!
//! Upstream merge reports arrive in several loosely-structured shapes. This
//! library folds them into one canonical record type, derives query-friendly
//! fields, and locates the changelog entry belonging to a given version.
//!
//! ## Core
//!
//! - [`parse_duration`] - Free-form age expressions ("5d", "2w", "1mo") to days
//! - [`normalize`] - Raw report payloads to [`MergeRecord`] values
//! - [`extract_entry`] - One version's entry out of a multi-entry changelog
//! - [`looks_like_valid_content`] - Rejects HTML error pages and stubs
//!
//! ## Retrieval
//!
//! - [`Fetcher`] - Fetches reports and changelogs over ordered access paths
//! - [`MergesConfig`] - Endpoint and proxy configuration
//!
//! ## Querying
//!
//! - [`RecordQuery`] - Filter and sort normalized records
//!
//! ## Examples
//!
//! ```
//! use merges_lib::{normalize, Classification};
//! use serde_json::json;
//!
//! let payload = json!([["array-pkg", "2.0-1", "2.0-2"]]);
//! let records = normalize(&payload, Classification::Universe);
//! assert_eq!(records[0].name, "array-pkg");
//! assert!(records[0].groups.is_empty());
//! ```

pub mod changelog;
pub mod config;
pub mod constants;
mod duration;
pub mod normalize;
pub mod query;
pub mod retrieval;
mod types;
mod validity;

pub use changelog::{
    ChangelogEntry, ChangelogSide, VersionEncoding, changelog_versions, extract_entry,
};
pub use config::{ConfigError, MergesConfig};
pub use duration::{parse_duration, parse_duration_value};
pub use normalize::{NoopSink, TracingSink, WarningSink, combine_batches, normalize, normalize_with};
pub use query::{QueryError, RecordQuery, SortKey, TeamCount, team_summary};
pub use retrieval::{AccessPath, BatchSnapshot, ChangelogPair, Fetcher, RetrievalError};
pub use types::{Classification, MergeRecord};
pub use validity::looks_like_valid_content;
