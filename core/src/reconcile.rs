//! Tracker reconciliation: coercing a loose record into schema shape.
//!
//! [`reconcile_tracker`] walks the schema in declaration order and coerces the
//! input record field by field. Values of the wrong shape are never rejected:
//! they are diverted into the `_extraFields` side channel and a synthesized
//! default takes their place, so the output always contains every included
//! field. Input keys the schema does not claim are preserved verbatim in the
//! same side channel.

use indexmap::IndexMap;
use tracing::debug;

use crate::{FieldDefinition, FieldInclude, FieldKind, Record, TrackerSchema};

/// Reserved output key holding data the schema did not claim.
pub const EXTRA_FIELDS_KEY: &str = "_extraFields";

/// Placeholder emitted for a `STRING` field with no default value.
pub(crate) const STRING_PLACEHOLDER: &str = "Updated if Changed";

/// Placeholder entity key for a `FOR_EACH_OBJECT` field with no default value.
pub(crate) const DEFAULT_ENTITY_KEY: &str = "default";

/// Coerces a record into schema-conformant shape.
///
/// The output map contains exactly the included schema fields, in schema
/// order, plus `_extraFields` when `include_extras` is true and anything
/// unclaimed or wrong-shaped was found. The input is never mutated.
///
/// # Examples
///
/// ```
/// use scene_tracker_core::*;
///
/// let schema = TrackerSchema::new()
///     .with_field(FieldDefinition::string("Time"))
///     .with_field(FieldDefinition::array("Topics"));
///
/// let record = Record::from(serde_json::json!({"Time": "09:00", "Mood": "tense"}));
/// let tracker = reconcile_tracker(&record, &schema, FieldInclude::All, true);
///
/// assert_eq!(tracker.get("Time").and_then(Record::as_str), Some("09:00"));
/// assert!(tracker.get("Topics").is_some_and(Record::is_seq));
/// // The unmodeled key survives under _extraFields.
/// let extras = tracker.get("_extraFields").unwrap();
/// assert_eq!(extras.get("Mood").and_then(Record::as_str), Some("tense"));
/// ```
pub fn reconcile_tracker(
    record: &Record,
    schema: &TrackerSchema,
    include: FieldInclude,
    include_extras: bool,
) -> Record {
    debug!(fields = schema.len(), include_extras, "reconciling tracker");
    let empty = IndexMap::new();
    let input = record.as_map().unwrap_or(&empty);

    let mut reconciled = IndexMap::new();
    let mut extras_map = IndexMap::new();

    for field in schema.fields() {
        if !include.includes(field.is_dynamic) {
            continue;
        }
        let value = input.get(&field.name);
        reconciled.insert(
            field.name.clone(),
            coerce_field(field, include, None, None, value, &mut extras_map),
        );
    }

    for (key, value) in input {
        if !reconciled.contains_key(key) && key != EXTRA_FIELDS_KEY {
            extras_map.insert(key.clone(), value.clone());
        }
    }

    let mut extras = Record::Map(extras_map);
    if let Some(existing) = input.get(EXTRA_FIELDS_KEY) {
        extras = merge_extra_fields(extras, existing);
    }

    if include_extras {
        attach_extras(&mut reconciled, extras);
    }

    Record::Map(reconciled)
}

/// Prunes the extras tree and attaches it under [`EXTRA_FIELDS_KEY`] if it
/// still holds anything: a map with at least one key, or a non-empty string.
pub(crate) fn attach_extras(tracker: &mut IndexMap<String, Record>, extras: Record) {
    let extras = extras.prune_empty();
    let keep = match &extras {
        Record::Map(map) => !map.is_empty(),
        Record::Str(s) => !s.is_empty(),
        Record::Seq(_) => false,
    };
    if keep {
        tracker.insert(EXTRA_FIELDS_KEY.to_string(), extras);
    }
}

/// Folds an incoming `_extraFields` value into the accumulated extras.
///
/// Map into map deep-merges with the incoming side winning on conflicts.
/// Every other pairing falls back to concatenating the two sides' string
/// forms (maps and sequences JSON-rendered), accumulated side first. The
/// fallback is lossy but deliberate: extras exist to avoid dropping data, so
/// shape conflicts degrade to text instead of discarding either side.
pub(crate) fn merge_extra_fields(current: Record, incoming: &Record) -> Record {
    if current.is_map() && incoming.is_map() {
        let mut merged = current;
        merged.deep_merge(incoming);
        merged
    } else {
        Record::Str(format!("{}{}", concat_form(&current), concat_form(incoming)))
    }
}

fn concat_form(value: &Record) -> String {
    match value {
        Record::Str(s) => s.clone(),
        other => other.to_json_string(),
    }
}

/// Coerces one field's value per its declared kind.
///
/// `example_index` selects an `example_values` entry during example
/// synthesis; `entity_index` is the positional index of the current entity
/// inside a `FOR_EACH_OBJECT` expansion, used to pick the matching element
/// out of sibling example arrays. Mismatched input values are stashed into
/// `extras` before a synthesized value takes their place.
pub(crate) fn coerce_field(
    field: &FieldDefinition,
    include: FieldInclude,
    example_index: Option<usize>,
    entity_index: Option<usize>,
    value: Option<&Record>,
    extras: &mut IndexMap<String, Record>,
) -> Record {
    match field.kind {
        FieldKind::String => coerce_string(field, example_index, entity_index, value, extras),
        FieldKind::Array => coerce_array(field, example_index, entity_index, value, extras),
        FieldKind::Object => {
            coerce_object(field, include, example_index, entity_index, value, extras)
        }
        FieldKind::ForEachObject => coerce_for_each(field, include, example_index, value, extras),
    }
}

fn coerce_string(
    field: &FieldDefinition,
    example_index: Option<usize>,
    entity_index: Option<usize>,
    value: Option<&Record>,
    extras: &mut IndexMap<String, Record>,
) -> Record {
    match value {
        Some(Record::Str(s)) => return Record::Str(s.clone()),
        Some(mismatched) => {
            extras.insert(field.name.clone(), mismatched.clone());
        }
        None => {}
    }

    if let Some(index) = example_index {
        if let Some(raw) = field.example_values.get(index) {
            return string_example(raw, entity_index);
        }
    }

    Record::Str(field.default_str().unwrap_or(STRING_PLACEHOLDER).to_string())
}

/// Decodes a `STRING` example: a JSON array yields the element at
/// `entity_index` (first element when absent or out of range), any other
/// successful decode yields the decoded value, and a decode failure yields
/// the raw string.
fn string_example(raw: &str, entity_index: Option<usize>) -> Record {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => {
            let items: Vec<Record> = items.into_iter().map(Record::from).collect();
            let index = entity_index.filter(|i| *i < items.len()).unwrap_or(0);
            items
                .into_iter()
                .nth(index)
                .unwrap_or_else(|| Record::Str(raw.to_string()))
        }
        Ok(value) => Record::from(value),
        Err(_) => Record::Str(raw.to_string()),
    }
}

fn coerce_array(
    field: &FieldDefinition,
    example_index: Option<usize>,
    entity_index: Option<usize>,
    value: Option<&Record>,
    extras: &mut IndexMap<String, Record>,
) -> Record {
    match value {
        Some(Record::Seq(items)) => return Record::Seq(items.clone()),
        Some(mismatched) => {
            extras.insert(field.name.clone(), mismatched.clone());
        }
        None => {}
    }

    if let Some(index) = example_index {
        if let Some(raw) = field.example_values.get(index) {
            return array_example(raw, entity_index);
        }
    }

    field
        .default_value
        .clone()
        .unwrap_or_else(|| Record::Seq(Vec::new()))
}

/// Decodes an `ARRAY` example: a JSON array yields the element at
/// `entity_index` when in range, else the whole array; any other successful
/// decode yields the decoded value; a decode failure yields the raw string.
fn array_example(raw: &str, entity_index: Option<usize>) -> Record {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => {
            let items: Vec<Record> = items.into_iter().map(Record::from).collect();
            if let Some(index) = entity_index {
                if let Some(item) = items.get(index) {
                    return item.clone();
                }
            }
            Record::Seq(items)
        }
        Ok(value) => Record::from(value),
        Err(_) => Record::Str(raw.to_string()),
    }
}

fn coerce_object(
    field: &FieldDefinition,
    include: FieldInclude,
    example_index: Option<usize>,
    entity_index: Option<usize>,
    value: Option<&Record>,
    extras: &mut IndexMap<String, Record>,
) -> Record {
    let empty_schema = TrackerSchema::new();
    let nested = field.nested_fields.as_ref().unwrap_or(&empty_schema);

    if let Some(Record::Map(entries)) = value {
        let mut object = IndexMap::new();
        for nested_field in nested.fields() {
            if !include.includes(nested_field.is_dynamic) {
                continue;
            }
            let nested_value = entries.get(&nested_field.name);
            object.insert(
                nested_field.name.clone(),
                coerce_field(nested_field, include, None, entity_index, nested_value, extras),
            );
        }

        // Keys the sub-schema does not claim, namespaced under this field.
        for (key, nested_value) in entries {
            if !object.contains_key(key) {
                let slot = extras
                    .entry(field.name.clone())
                    .or_insert_with(Record::empty_map);
                if !slot.is_map() {
                    *slot = Record::empty_map();
                }
                if let Record::Map(map) = slot {
                    map.insert(key.clone(), nested_value.clone());
                }
            }
        }

        return Record::Map(object);
    }

    if let Some(mismatched) = value {
        extras.insert(field.name.clone(), mismatched.clone());
    }

    let mut object = IndexMap::new();
    for nested_field in nested.fields() {
        if !include.includes(nested_field.is_dynamic) {
            continue;
        }
        object.insert(
            nested_field.name.clone(),
            coerce_field(nested_field, include, example_index, entity_index, None, extras),
        );
    }
    Record::Map(object)
}

fn coerce_for_each(
    field: &FieldDefinition,
    include: FieldInclude,
    example_index: Option<usize>,
    value: Option<&Record>,
    extras: &mut IndexMap<String, Record>,
) -> Record {
    let empty_schema = TrackerSchema::new();
    let nested = field.nested_fields.as_ref().unwrap_or(&empty_schema);

    if let Some(Record::Map(entries)) = value {
        let mut result = IndexMap::new();
        for (entity, entry) in entries {
            let mut object = IndexMap::new();
            let mut entity_extras = IndexMap::new();

            for nested_field in nested.fields() {
                if !include.includes(nested_field.is_dynamic) {
                    continue;
                }
                let nested_value = entry.get(&nested_field.name);
                object.insert(
                    nested_field.name.clone(),
                    coerce_field(nested_field, include, None, None, nested_value, &mut entity_extras),
                );
            }

            let entity_extra_value = match entry.as_map() {
                Some(entry_map) => {
                    for (key, nested_value) in entry_map {
                        if !object.contains_key(key) {
                            entity_extras.insert(key.clone(), nested_value.clone());
                        }
                    }
                    if entity_extras.is_empty() {
                        None
                    } else {
                        Some(Record::Map(entity_extras))
                    }
                }
                // The entity itself had the wrong shape; keep the raw value.
                None => Some(entry.clone()),
            };

            if let Some(extra) = entity_extra_value {
                let slot = extras
                    .entry(field.name.clone())
                    .or_insert_with(Record::empty_map);
                if !slot.is_map() {
                    *slot = Record::empty_map();
                }
                if let Record::Map(map) = slot {
                    map.insert(entity.clone(), extra);
                }
            }

            result.insert(entity.clone(), Record::Map(object));
        }
        return Record::Map(result);
    }

    if let Some(mismatched) = value {
        extras.insert(field.name.clone(), mismatched.clone());
    }

    let keys = entity_keys(field, example_index);
    let mut result = IndexMap::new();
    for (position, key) in keys.iter().enumerate() {
        let mut object = IndexMap::new();
        for nested_field in nested.fields() {
            if !include.includes(nested_field.is_dynamic) {
                continue;
            }
            object.insert(
                nested_field.name.clone(),
                coerce_field(nested_field, include, example_index, Some(position), None, extras),
            );
        }
        result.insert(key.clone(), Record::Map(object));
    }
    Record::Map(result)
}

/// Entity keys for a synthesized `FOR_EACH_OBJECT` expansion: the selected
/// example decoded as a JSON array of names, else a single default key.
fn entity_keys(field: &FieldDefinition, example_index: Option<usize>) -> Vec<String> {
    let fallback =
        || vec![field.default_str().unwrap_or(DEFAULT_ENTITY_KEY).to_string()];

    let Some(index) = example_index else {
        return fallback();
    };
    let Some(raw) = field.example_values.get(index) else {
        return fallback();
    };

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => fallback(),
    }
}
