//! Projection of a [`Record`] into the table store's entity shape.

use cehz_core::Record;
use serde::Serialize;

/// All entities land in one partition; the table is small and queried whole.
pub const PARTITION_KEY: &str = "DataPartition";

/// Characters the table store forbids in partition and row keys.
const FORBIDDEN_KEY_CHARS: [char; 4] = ['/', '\\', '#', '?'];

/// One keyed entity as sent to the table service. `Timestamp` here is the
/// run timestamp property, distinct from the system timestamp the store
/// maintains on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableEntity {
    pub partition_key: String,
    pub row_key: String,
    pub timestamp: String,
    pub label: String,
    pub value: String,
}

impl From<&Record> for TableEntity {
    fn from(record: &Record) -> Self {
        Self {
            partition_key: PARTITION_KEY.to_string(),
            row_key: row_key(&record.timestamp, &record.label),
            timestamp: record.timestamp.clone(),
            label: record.label.clone(),
            value: record.value.clone(),
        }
    }
}

/// Deterministic `{timestamp}-{label}` row key, sanitized for the store.
/// Repeated runs over the same page produce the same keys, so writes are
/// idempotent overwrites rather than duplicates.
#[must_use]
pub fn row_key(timestamp: &str, label: &str) -> String {
    let raw = format!("{timestamp}-{label}");
    raw.chars()
        .map(|c| {
            if FORBIDDEN_KEY_CHARS.contains(&c) || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect()
}

/// Drop entities whose row key already appeared earlier in the batch.
/// Duplicate labels within one page would otherwise race against
/// themselves; first occurrence wins, matching document order.
#[must_use]
pub fn dedup_by_row_key(entities: Vec<TableEntity>) -> Vec<TableEntity> {
    let mut seen = std::collections::HashSet::new();
    let mut kept = Vec::with_capacity(entities.len());
    for entity in entities {
        if seen.insert(entity.row_key.clone()) {
            kept.push(entity);
        } else {
            tracing::warn!(row_key = %entity.row_key, "duplicate row key in batch, keeping first occurrence");
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, value: &str) -> Record {
        Record {
            timestamp: "2025-06-01 12:00:00".to_string(),
            label: label.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn row_key_is_timestamp_dash_label() {
        assert_eq!(
            row_key("2025-06-01 12:00:00", "Flow"),
            "2025-06-01 12:00:00-Flow"
        );
    }

    #[test]
    fn row_key_replaces_forbidden_characters() {
        assert_eq!(
            row_key("2025-06-01 12:00:00", "a/b\\c#d?e"),
            "2025-06-01 12:00:00-a-b-c-d-e"
        );
    }

    #[test]
    fn row_key_replaces_control_characters() {
        assert_eq!(row_key("t", "a\nb"), "t-a-b");
    }

    #[test]
    fn entity_serializes_with_pascal_case_properties() {
        let entity = TableEntity::from(&record("Flow", "12.3"));
        let json = serde_json::to_value(&entity).expect("serialize");
        assert_eq!(json["PartitionKey"], "DataPartition");
        assert_eq!(json["RowKey"], "2025-06-01 12:00:00-Flow");
        assert_eq!(json["Timestamp"], "2025-06-01 12:00:00");
        assert_eq!(json["Label"], "Flow");
        assert_eq!(json["Value"], "12.3");
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let entities = vec![
            TableEntity::from(&record("Flow", "12.3")),
            TableEntity::from(&record("Flow", "99.9")),
            TableEntity::from(&record("Level", "4")),
        ];
        let kept = dedup_by_row_key(entities);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].value, "12.3", "first occurrence wins");
        assert_eq!(kept[1].label, "Level");
    }

    #[test]
    fn dedup_passes_distinct_keys_through_in_order() {
        let entities = vec![
            TableEntity::from(&record("A", "1")),
            TableEntity::from(&record("B", "2")),
        ];
        let kept = dedup_by_row_key(entities);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].label, "A");
        assert_eq!(kept[1].label, "B");
    }
}
