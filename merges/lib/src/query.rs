//! Filtering, sorting and summarizing normalized records.

use std::cmp::Ordering;
use std::collections::HashMap;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::types::{Classification, MergeRecord};

/// Errors that can occur while building a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid glob pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Sort order for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortKey {
    /// Snapshot order: classification, then upstream position.
    #[default]
    Default,
    Name,
    Age,
    Classification,
}

/// A filter and sort over merge records.
///
/// Filters combine with AND. Within the classification and pattern filters
/// any single match is enough.
///
/// ## Examples
///
/// ```
/// use merges_lib::{normalize, Classification, RecordQuery, SortKey};
/// use serde_json::json;
///
/// let records = normalize(
///     &json!([
///         { "source_package": "libfoo", "age": "10d", "teams": ["desktop"] },
///         { "source_package": "bar", "age": "2d", "teams": ["server"] },
///         { "source_package": "libbaz", "age": "40d", "teams": ["desktop"] },
///     ]),
///     Classification::Main,
/// );
///
/// let found = RecordQuery::new()
///     .pattern("lib*")
///     .team("Desktop")
///     .sort(SortKey::Age)
///     .reverse(true)
///     .apply(records)
///     .unwrap();
///
/// let names: Vec<_> = found.iter().map(|r| r.name.as_str()).collect();
/// assert_eq!(names, ["libbaz", "libfoo"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    classifications: Vec<Classification>,
    team: Option<String>,
    patterns: Vec<String>,
    submitter: Option<String>,
    min_age: Option<u32>,
    max_age: Option<u32>,
    sort: SortKey,
    reverse: bool,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps records in `classification`. May be given more than once.
    pub fn classification(mut self, classification: Classification) -> Self {
        if !self.classifications.contains(&classification) {
            self.classifications.push(classification);
        }
        self
    }

    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Keeps records whose name matches the glob `pattern`, ignoring case.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Keeps records whose submitter contains `needle`, ignoring case.
    pub fn submitter(mut self, needle: impl Into<String>) -> Self {
        self.submitter = Some(needle.into());
        self
    }

    pub fn min_age(mut self, days: u32) -> Self {
        self.min_age = Some(days);
        self
    }

    pub fn max_age(mut self, days: u32) -> Self {
        self.max_age = Some(days);
        self
    }

    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort = key;
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Filters and sorts `records`.
    ///
    /// ## Errors
    ///
    /// Returns [`QueryError::InvalidPattern`] if a name pattern is not a
    /// valid glob.
    pub fn apply(&self, records: Vec<MergeRecord>) -> Result<Vec<MergeRecord>, QueryError> {
        let matcher = if self.patterns.is_empty() {
            None
        } else {
            Some(build_glob_matcher(&self.patterns)?)
        };
        let submitter = self.submitter.as_ref().map(|s| s.to_lowercase());

        let mut kept: Vec<MergeRecord> = records
            .into_iter()
            .filter(|record| {
                (self.classifications.is_empty()
                    || self.classifications.contains(&record.classification))
                    && self.team.as_ref().is_none_or(|team| record.has_group(team))
                    && matcher.as_ref().is_none_or(|m| m.is_match(&record.name))
                    && submitter
                        .as_ref()
                        .is_none_or(|needle| record.submitter.to_lowercase().contains(needle))
                    && self.min_age.is_none_or(|min| record.age_days >= min)
                    && self.max_age.is_none_or(|max| record.age_days <= max)
            })
            .collect();

        match self.sort {
            SortKey::Default => {
                if self.reverse {
                    kept.reverse();
                }
            }
            key => {
                let reverse = self.reverse;
                kept.sort_by(|a, b| {
                    let ordering = compare(key, a, b);
                    if reverse { ordering.reverse() } else { ordering }
                });
            }
        }

        Ok(kept)
    }
}

fn compare(key: SortKey, a: &MergeRecord, b: &MergeRecord) -> Ordering {
    match key {
        SortKey::Default => Ordering::Equal,
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Age => a.age_days.cmp(&b.age_days),
        SortKey::Classification => a.classification.cmp(&b.classification),
    }
}

fn build_glob_matcher(patterns: &[String]) -> Result<GlobSet, QueryError> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| QueryError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }

    builder.build().map_err(|source| QueryError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}

/// Number of records owned by one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamCount {
    pub team: String,
    pub count: usize,
}

/// Counts records per team, busiest first, ties by name.
///
/// A record listing the same team twice is counted once for it.
pub fn team_summary(records: &[MergeRecord]) -> Vec<TeamCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let mut seen: Vec<&str> = Vec::with_capacity(record.groups.len());
        for group in &record.groups {
            if !seen.contains(&group.as_str()) {
                seen.push(group);
                *counts.entry(group).or_default() += 1;
            }
        }
    }

    let mut summary: Vec<TeamCount> = counts
        .into_iter()
        .map(|(team, count)| TeamCount {
            team: team.to_string(),
            count,
        })
        .collect();
    summary.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.team.cmp(&b.team)));
    summary
}
