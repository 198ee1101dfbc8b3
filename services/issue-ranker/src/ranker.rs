//! Issue Ranking
//!
//! Orders backlog records by priority, then impact, then estimated effort,
//! and keeps the first N. Records are never modified; a sort key is derived
//! per record and the input position is the final tie-break.

use serde_yaml::Value;
use std::cmp::Reverse;

use crate::tier::{parse_or_default, Estimate, Impact, Priority};

const LABELS_FIELD: &str = "labels";

/// Upper-cased tier values of a record, before scoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub priority: String,
    pub impact: String,
    pub estimate: String,
}

/// Ordering key of a record. Ascending order puts the best record first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    priority: Reverse<u8>,
    impact: Reverse<u8>,
    estimate: u8,
    index: usize,
}

impl SortKey {
    /// Position of the record in the input
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Resolve the tier values of a record.
///
/// A direct string field wins, even when it names an unknown tier.
/// Otherwise the first `priority:` / `impact:` label is used. Estimate has
/// no label form.
pub fn normalize(record: &Value) -> Normalized {
    Normalized {
        priority: direct_field(record, "priority")
            .or_else(|| label_value(record, "priority:"))
            .unwrap_or_else(|| Priority::default().to_string()),
        impact: direct_field(record, "impact")
            .or_else(|| label_value(record, "impact:"))
            .unwrap_or_else(|| Impact::default().to_string()),
        estimate: direct_field(record, "estimate")
            .unwrap_or_else(|| Estimate::default().to_string()),
    }
}

/// Compute the sort key of the record found at `index` in the input
pub fn sort_key(record: &Value, index: usize) -> SortKey {
    let normalized = normalize(record);

    SortKey {
        priority: Reverse(parse_or_default::<Priority>(&normalized.priority).score()),
        impact: Reverse(parse_or_default::<Impact>(&normalized.impact).score()),
        estimate: parse_or_default::<Estimate>(&normalized.estimate).score(),
        index,
    }
}

/// Rank `records` and return clones of the first `limit`.
///
/// The result has `min(limit, records.len())` entries.
pub fn select(records: &[Value], limit: usize) -> Vec<Value> {
    let mut keyed: Vec<(SortKey, &Value)> = records
        .iter()
        .enumerate()
        .map(|(index, record)| (sort_key(record, index), record))
        .collect();

    // Keys are unique through the index component
    keyed.sort_unstable_by_key(|(key, _)| *key);

    keyed
        .into_iter()
        .take(limit)
        .map(|(_, record)| record.clone())
        .collect()
}

fn direct_field(record: &Value, field: &str) -> Option<String> {
    record.get(field).and_then(Value::as_str).map(str::to_uppercase)
}

fn label_value(record: &Value, prefix: &str) -> Option<String> {
    record
        .get(LABELS_FIELD)?
        .as_sequence()?
        .iter()
        .filter_map(Value::as_str)
        .find(|label| label.to_lowercase().starts_with(prefix))
        .and_then(|label| label.split_once(':'))
        .map(|(_, value)| value.to_uppercase())
}
