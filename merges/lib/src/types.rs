//! Core data types for normalized merge records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Which upstream report batch a record came from.
///
/// Variant order is the order batches are combined in, which downstream
/// default sorting relies on.
///
/// ## Examples
///
/// ```
/// use merges_lib::Classification;
///
/// let parsed: Classification = "universe".parse().unwrap();
/// assert_eq!(parsed, Classification::Universe);
/// assert_eq!(parsed.to_string(), "UNIVERSE");
/// assert_eq!(parsed.report_slug(), "universe");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    Main,
    Universe,
    Restricted,
    Multiverse,
}

impl Classification {
    /// Lower-case name used in report file names and archive pool paths.
    pub fn report_slug(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Universe => "universe",
            Self::Restricted => "restricted",
            Self::Multiverse => "multiverse",
        }
    }

    /// All classifications in combination order.
    pub fn ordered() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// One pending merge, reconciled from whatever shape upstream reported.
///
/// Records are rebuilt wholesale on every normalization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRecord {
    /// Unique within a combined snapshot: classification, name and batch position.
    pub identity: String,
    pub name: String,
    /// Downstream (Ubuntu) side of the comparison.
    pub primary_version: String,
    /// Upstream (Debian) side of the comparison.
    pub reference_version: String,
    pub classification: Classification,
    /// Owning teams. Duplicates are kept as reported.
    pub groups: Vec<String>,
    /// Age expression exactly as upstream supplied it.
    pub age_raw: String,
    pub age_days: u32,
    pub submitter: String,
    /// When this record was normalized, not an upstream value.
    pub observed_at: DateTime<Utc>,
}

impl MergeRecord {
    /// Builds the identity string for a record at `position` within its batch.
    ///
    /// ## Examples
    ///
    /// ```
    /// use merges_lib::{Classification, MergeRecord};
    ///
    /// let id = MergeRecord::identity_for(Classification::Main, "glibc", 3);
    /// assert_eq!(id, "MAIN-glibc-3");
    /// ```
    pub fn identity_for(classification: Classification, name: &str, position: usize) -> String {
        format!("{classification}-{name}-{position}")
    }

    /// Returns `true` if any owning team matches `team`, ignoring case.
    pub fn has_group(&self, team: &str) -> bool {
        self.groups.iter().any(|g| g.eq_ignore_ascii_case(team))
    }
}
