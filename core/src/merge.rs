//! Update merging: reconciling a new tracker against a previous one.
//!
//! [`update_tracker`] combines a previously reconciled tracker with a new,
//! possibly partial, update. Every schema field is considered (the include
//! filter is fixed to `All` — update semantics never skip fields), the
//! updated side wins wherever it defines a value, and extras are either
//! preserved-and-merged or taken verbatim from the update.
//!
//! # Example
//!
//! ```
//! use scene_tracker_core::*;
//!
//! let schema = TrackerSchema::new()
//!     .with_field(FieldDefinition::string("Time"))
//!     .with_field(FieldDefinition::string("Location"));
//!
//! let original = Record::from(serde_json::json!({"Time": "09:00", "Location": "Pier 39"}));
//! let update = Record::from(serde_json::json!({"Time": "09:05"}));
//!
//! let merged = update_tracker(&original, &update, &schema, true, false);
//! assert_eq!(merged.get("Time").and_then(Record::as_str), Some("09:05"));
//! assert_eq!(merged.get("Location").and_then(Record::as_str), Some("Pier 39"));
//! ```

use indexmap::IndexMap;
use tracing::debug;

use crate::reconcile::{EXTRA_FIELDS_KEY, attach_extras, coerce_field, merge_extra_fields};
use crate::{FieldInclude, Record, TrackerSchema};

/// Merges an update into an existing tracker, producing a new conformant
/// record.
///
/// Field precedence: `updated` wins wherever it defines the field, else the
/// `original` value is carried over, else a default is synthesized. Values
/// still pass through per-kind coercion, so shape mismatches in the update
/// are routed to extras like everywhere else.
///
/// Extras handling:
/// - `updated_extras_win = false`: unclaimed keys from `updated`, then from
///   `original`, then `original._extraFields` deep-merged in, then
///   `updated._extraFields` on top (later merges win).
/// - `updated_extras_win = true`: the final `_extraFields` is taken verbatim
///   from `updated` when present — editor workflows where the update fully
///   supersedes prior extras.
pub fn update_tracker(
    original: &Record,
    updated: &Record,
    schema: &TrackerSchema,
    include_extras: bool,
    updated_extras_win: bool,
) -> Record {
    debug!(
        fields = schema.len(),
        include_extras, updated_extras_win, "merging tracker update"
    );
    let empty = IndexMap::new();
    let original_map = original.as_map().unwrap_or(&empty);
    let updated_map = updated.as_map().unwrap_or(&empty);

    let mut merged = IndexMap::new();
    let mut extras_map = IndexMap::new();

    for field in schema.fields() {
        let value = updated_map
            .get(&field.name)
            .or_else(|| original_map.get(&field.name));
        merged.insert(
            field.name.clone(),
            coerce_field(field, FieldInclude::All, None, None, value, &mut extras_map),
        );
    }

    if include_extras {
        for (key, value) in updated_map {
            if !merged.contains_key(key) && key != EXTRA_FIELDS_KEY {
                extras_map.insert(key.clone(), value.clone());
            }
        }
        if !updated_extras_win {
            for (key, value) in original_map {
                if !merged.contains_key(key)
                    && !extras_map.contains_key(key)
                    && key != EXTRA_FIELDS_KEY
                {
                    extras_map.insert(key.clone(), value.clone());
                }
            }
        }
    }

    if updated_extras_win {
        if let Some(extra) = updated_map.get(EXTRA_FIELDS_KEY) {
            merged.insert(EXTRA_FIELDS_KEY.to_string(), extra.clone());
        }
    } else if include_extras {
        let mut extras = Record::Map(extras_map);
        if let Some(existing) = original_map.get(EXTRA_FIELDS_KEY) {
            extras = merge_extra_fields(extras, existing);
        }
        if let Some(existing) = updated_map.get(EXTRA_FIELDS_KEY) {
            extras = merge_extra_fields(extras, existing);
        }
        attach_extras(&mut merged, extras);
    }

    Record::Map(merged)
}

#[cfg(test)]
mod tests {
    use crate::FieldDefinition;

    use super::*;

    fn schema() -> TrackerSchema {
        TrackerSchema::new()
            .with_field(FieldDefinition::string("Time"))
            .with_field(FieldDefinition::string("Location"))
            .with_field(FieldDefinition::array("Topics"))
    }

    fn record(json: serde_json::Value) -> Record {
        Record::from(json)
    }

    #[test]
    fn test_updated_field_wins_else_original() {
        let original = record(serde_json::json!({
            "Time": "09:00", "Location": "Pier 39", "Topics": ["fog"]
        }));
        let update = record(serde_json::json!({"Time": "09:05"}));

        let merged = update_tracker(&original, &update, &schema(), true, false);
        assert_eq!(merged.get("Time"), Some(&Record::from("09:05")));
        assert_eq!(merged.get("Location"), Some(&Record::from("Pier 39")));
        assert_eq!(merged.get("Topics"), Some(&record(serde_json::json!(["fog"]))));
    }

    #[test]
    fn test_merge_considers_static_fields_too() {
        let schema = TrackerSchema::new()
            .with_field(FieldDefinition::string("Name").static_field())
            .with_field(FieldDefinition::string("Time"));

        let original = record(serde_json::json!({"Name": "Ava", "Time": "09:00"}));
        let update = record(serde_json::json!({"Time": "09:05"}));

        let merged = update_tracker(&original, &update, &schema, true, false);
        assert_eq!(merged.get("Name"), Some(&Record::from("Ava")));
    }

    #[test]
    fn test_missing_everywhere_synthesizes_default() {
        let merged = update_tracker(
            &record(serde_json::json!({})),
            &record(serde_json::json!({})),
            &schema(),
            true,
            false,
        );
        assert!(merged.get("Time").is_some_and(Record::is_str));
        assert_eq!(merged.get("Topics"), Some(&Record::Seq(Vec::new())));
    }

    #[test]
    fn test_extras_preserve_and_merge_precedence() {
        let original = record(serde_json::json!({
            "Mood": "calm",
            "_extraFields": {"Lore": {"era": "1920s"}, "shared": "old"}
        }));
        let update = record(serde_json::json!({
            "Mood": "tense",
            "_extraFields": {"shared": "new"}
        }));

        let merged = update_tracker(&original, &update, &schema(), true, false);
        let extras = merged.get(EXTRA_FIELDS_KEY).unwrap();

        // Unclaimed key: the updated side was collected first and wins.
        assert_eq!(extras.get("Mood"), Some(&Record::from("tense")));
        // Original extras survive; updated extras win on conflicts.
        assert_eq!(
            extras.get("Lore"),
            Some(&record(serde_json::json!({"era": "1920s"})))
        );
        assert_eq!(extras.get("shared"), Some(&Record::from("new")));
    }

    #[test]
    fn test_updated_extras_win_takes_value_verbatim() {
        let original = record(serde_json::json!({
            "_extraFields": {"Lore": {"era": "1920s"}}
        }));
        let update = record(serde_json::json!({
            "_extraFields": {"Note": "fresh"}
        }));

        let merged = update_tracker(&original, &update, &schema(), true, true);
        assert_eq!(
            merged.get(EXTRA_FIELDS_KEY),
            Some(&record(serde_json::json!({"Note": "fresh"})))
        );
    }

    #[test]
    fn test_updated_extras_win_without_updated_extras_attaches_nothing() {
        let original = record(serde_json::json!({
            "_extraFields": {"Lore": "kept elsewhere"}
        }));
        let update = record(serde_json::json!({"Time": "10:00"}));

        let merged = update_tracker(&original, &update, &schema(), true, true);
        assert!(merged.get(EXTRA_FIELDS_KEY).is_none());
    }

    #[test]
    fn test_mismatched_update_value_falls_back_to_original_default_path() {
        let original = record(serde_json::json!({"Topics": ["fog"]}));
        let update = record(serde_json::json!({"Topics": "not a list"}));

        let merged = update_tracker(&original, &update, &schema(), true, false);
        // The wrong-shaped updated value is stashed and the field synthesized.
        assert_eq!(merged.get("Topics"), Some(&Record::Seq(Vec::new())));
        assert_eq!(
            merged.get(EXTRA_FIELDS_KEY).and_then(|e| e.get("Topics")),
            Some(&Record::from("not a list"))
        );
    }
}
