//! Reconciliation of raw merge reports into [`MergeRecord`] values.
//!
//! Reports come in as a keyed map of objects, an array of objects, or an
//! array of positional arrays, with inconsistent key casing and naming. The
//! normalizer is total over any JSON value: the worst case is an empty result
//! or records filled with sentinels.
//!
//! ## Examples
//!
//! ```
//! use merges_lib::{normalize, Classification};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "hello": { "Source_Package": "hello", "Left_Version": "2.10-3ubuntu1", "age": "2w" }
//! });
//!
//! let records = normalize(&payload, Classification::Main);
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].name, "hello");
//! assert_eq!(records[0].age_days, 14);
//! assert_eq!(records[0].reference_version, "N/A");
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use crate::constants::{
    AGE_KEY, DIAGNOSTIC_KEY_SAMPLE, GROUPS_KEY, NAME_KEYS, NOT_APPLICABLE, PRIMARY_VERSION_KEYS,
    REFERENCE_VERSION_KEYS, SUBMITTER_KEYS, UNKNOWN,
};
use crate::duration::parse_duration;
use crate::types::{Classification, MergeRecord};

/// Receives warnings about malformed upstream input.
///
/// The normalizer itself stays free of side effects; whatever the sink does
/// with a warning is up to the caller.
pub trait WarningSink: Send + Sync {
    fn warn(&self, message: &str, context: &Value);
}

/// Forwards warnings to `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, message: &str, context: &Value) {
        tracing::warn!(context = %context, "{message}");
    }
}

/// Discards warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl WarningSink for NoopSink {
    fn warn(&self, _message: &str, _context: &Value) {}
}

/// Normalizes one report batch, logging through `tracing` and stamping the
/// current time.
pub fn normalize(payload: &Value, classification: Classification) -> Vec<MergeRecord> {
    normalize_with(payload, classification, &TracingSink, Utc::now())
}

/// Normalizes one report batch with an explicit warning sink and timestamp.
///
/// A keyed map contributes its values in upstream order. `null` entries are
/// skipped before positions are assigned, so identities stay dense.
///
/// ## Examples
///
/// ```
/// use chrono::Utc;
/// use merges_lib::{normalize_with, Classification, NoopSink};
/// use serde_json::json;
///
/// let records = normalize_with(&json!("not a report"), Classification::Main, &NoopSink, Utc::now());
/// assert!(records.is_empty());
/// ```
pub fn normalize_with(
    payload: &Value,
    classification: Classification,
    sink: &dyn WarningSink,
    observed_at: DateTime<Utc>,
) -> Vec<MergeRecord> {
    let entries: Vec<&Value> = match payload {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        other => {
            sink.warn(
                "unexpected report shape, expected an array or object",
                &json!({
                    "classification": classification.to_string(),
                    "shape": shape_name(other),
                }),
            );
            return Vec::new();
        }
    };

    let records: Vec<MergeRecord> = entries
        .into_iter()
        .filter(|entry| !entry.is_null())
        .enumerate()
        .map(|(position, entry)| {
            RawEntry::from_value(entry)
                .resolve()
                .into_record(classification, position, observed_at)
        })
        .collect();

    tracing::debug!(
        classification = %classification,
        count = records.len(),
        "normalized report batch"
    );

    records
}

/// Concatenates normalized batches in [`Classification`] order.
///
/// The input order of `batches` does not matter; records within a batch keep
/// their relative order.
pub fn combine_batches(
    batches: impl IntoIterator<Item = (Classification, Vec<MergeRecord>)>,
) -> Vec<MergeRecord> {
    let mut batches: Vec<_> = batches.into_iter().collect();
    batches.sort_by_key(|(classification, _)| *classification);
    batches.into_iter().flat_map(|(_, records)| records).collect()
}

/// The two entry shapes upstream uses, plus anything else.
enum RawEntry<'a> {
    /// `[name, primary_version, reference_version]`
    Positional(&'a [Value]),
    Keyed(&'a Map<String, Value>),
    /// A bare string, number or boolean where an entry was expected.
    Scalar,
}

impl<'a> RawEntry<'a> {
    fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Self::Positional(items),
            Value::Object(map) => Self::Keyed(map),
            _ => Self::Scalar,
        }
    }

    fn resolve(&self) -> ResolvedFields {
        match self {
            Self::Positional(items) => ResolvedFields {
                name: truthy_text(items.first()).unwrap_or_else(|| UNKNOWN.to_string()),
                primary_version: truthy_text(items.get(1))
                    .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
                reference_version: truthy_text(items.get(2))
                    .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
                ..ResolvedFields::default()
            },
            Self::Keyed(map) => resolve_keyed(map),
            Self::Scalar => ResolvedFields {
                name: diagnostic_name(std::iter::empty()),
                ..ResolvedFields::default()
            },
        }
    }
}

struct ResolvedFields {
    name: String,
    primary_version: String,
    reference_version: String,
    groups: Vec<String>,
    age_raw: String,
    submitter: String,
}

impl Default for ResolvedFields {
    fn default() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            primary_version: NOT_APPLICABLE.to_string(),
            reference_version: NOT_APPLICABLE.to_string(),
            groups: Vec::new(),
            age_raw: NOT_APPLICABLE.to_string(),
            submitter: UNKNOWN.to_string(),
        }
    }
}

impl ResolvedFields {
    fn into_record(
        self,
        classification: Classification,
        position: usize,
        observed_at: DateTime<Utc>,
    ) -> MergeRecord {
        MergeRecord {
            identity: MergeRecord::identity_for(classification, &self.name, position),
            age_days: parse_duration(&self.age_raw),
            name: self.name,
            primary_version: self.primary_version,
            reference_version: self.reference_version,
            classification,
            groups: self.groups,
            age_raw: self.age_raw,
            submitter: self.submitter,
            observed_at,
        }
    }
}

fn resolve_keyed(map: &Map<String, Value>) -> ResolvedFields {
    // Later keys win when two differ only by case.
    let lowered: HashMap<String, &Value> = map
        .iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect();

    let first_present = |candidates: &[&str]| -> Option<String> {
        candidates
            .iter()
            .find_map(|key| lowered.get(*key).filter(|value| !value.is_null()))
            .map(|value| text_of(value))
    };

    // An empty name is no name: fall through to the next candidate.
    let name = NAME_KEYS
        .iter()
        .filter_map(|key| lowered.get(*key).filter(|value| !value.is_null()))
        .map(|value| text_of(value))
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| diagnostic_name(map.keys()));

    let groups = match lowered.get(GROUPS_KEY) {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(text_of)
            .collect(),
        _ => Vec::new(),
    };

    ResolvedFields {
        name,
        primary_version: first_present(PRIMARY_VERSION_KEYS)
            .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        reference_version: first_present(REFERENCE_VERSION_KEYS)
            .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        groups,
        age_raw: truthy_text(lowered.get(AGE_KEY).copied())
            .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        submitter: first_present(SUBMITTER_KEYS).unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

/// Placeholder name embedding a sample of the entry's original keys, so that
/// unknown upstream shapes stay visible instead of vanishing.
fn diagnostic_name<'k>(keys: impl Iterator<Item = &'k String>) -> String {
    let sample: Vec<&str> = keys.take(DIAGNOSTIC_KEY_SAMPLE).map(String::as_str).collect();
    if sample.is_empty() {
        format!("{UNKNOWN} (keys: none)")
    } else {
        format!("{UNKNOWN} (keys: {})", sample.join(", "))
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text of `value` unless it is missing, `null`, `false`, `0` or `""`.
fn truthy_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(text_of(other)),
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
