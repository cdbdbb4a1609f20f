//! Default and example tracker synthesis from a schema alone.

use indexmap::IndexMap;

use crate::reconcile::coerce_field;
use crate::{FieldInclude, Record, TrackerSchema};

/// Synthesizes a tracker from the schema's default values.
///
/// `STRING` fields fall back to a fixed placeholder when they have no
/// default, `ARRAY` fields to an empty sequence, and `FOR_EACH_OBJECT`
/// fields expand to a single placeholder entity.
///
/// # Examples
///
/// ```
/// use scene_tracker_core::*;
///
/// let schema = TrackerSchema::new()
///     .with_field(FieldDefinition::string("Time").with_default("00:00:00"))
///     .with_field(FieldDefinition::array("Topics"));
///
/// let tracker = default_tracker(&schema, FieldInclude::All);
/// assert_eq!(tracker.get("Time").and_then(Record::as_str), Some("00:00:00"));
/// assert_eq!(tracker.get("Topics"), Some(&Record::Seq(Vec::new())));
/// ```
pub fn default_tracker(schema: &TrackerSchema, include: FieldInclude) -> Record {
    synthesize(schema, include, None)
}

/// Synthesizes the parallel example-tracker set, one record per example
/// index up to [`TrackerSchema::max_example_count`].
///
/// Example values are decoded as JSON where possible; inside a
/// `FOR_EACH_OBJECT` expansion, sibling example arrays supply the i-th
/// element to the i-th entity.
///
/// # Examples
///
/// ```
/// use scene_tracker_core::*;
///
/// let character = TrackerSchema::new()
///     .with_field(FieldDefinition::string("Hair").with_example(r#"["short", "long"]"#));
/// let schema = TrackerSchema::new()
///     .with_field(FieldDefinition::for_each_object("Characters", character)
///         .with_example(r#"["Ava", "Bea"]"#));
///
/// let examples = example_trackers(&schema, FieldInclude::All);
/// assert_eq!(examples.len(), 1);
/// let ava = examples[0].get("Characters").and_then(|c| c.get("Ava")).unwrap();
/// assert_eq!(ava.get("Hair").and_then(Record::as_str), Some("short"));
/// let bea = examples[0].get("Characters").and_then(|c| c.get("Bea")).unwrap();
/// assert_eq!(bea.get("Hair").and_then(Record::as_str), Some("long"));
/// ```
pub fn example_trackers(schema: &TrackerSchema, include: FieldInclude) -> Vec<Record> {
    (0..schema.max_example_count())
        .map(|index| synthesize(schema, include, Some(index)))
        .collect()
}

fn synthesize(schema: &TrackerSchema, include: FieldInclude, example_index: Option<usize>) -> Record {
    let mut tracker = IndexMap::new();
    // Synthesis has no input values, so nothing can land in extras.
    let mut scratch = IndexMap::new();
    for field in schema.fields() {
        if !include.includes(field.is_dynamic) {
            continue;
        }
        tracker.insert(
            field.name.clone(),
            coerce_field(field, include, example_index, None, None, &mut scratch),
        );
    }
    Record::Map(tracker)
}

#[cfg(test)]
mod tests {
    use crate::FieldDefinition;
    use crate::reconcile::{DEFAULT_ENTITY_KEY, STRING_PLACEHOLDER};

    use super::*;

    #[test]
    fn test_default_tracker_uses_placeholders() {
        let nested = TrackerSchema::new().with_field(FieldDefinition::string("Hair"));
        let schema = TrackerSchema::new()
            .with_field(FieldDefinition::string("Time"))
            .with_field(FieldDefinition::for_each_object("Characters", nested));

        let tracker = default_tracker(&schema, FieldInclude::All);
        assert_eq!(
            tracker.get("Time").and_then(Record::as_str),
            Some(STRING_PLACEHOLDER)
        );
        let characters = tracker.get("Characters").and_then(Record::as_map).unwrap();
        assert!(characters.contains_key(DEFAULT_ENTITY_KEY));
    }

    #[test]
    fn test_default_entity_key_from_default_value() {
        let nested = TrackerSchema::new().with_field(FieldDefinition::string("Hair"));
        let schema = TrackerSchema::new().with_field(
            FieldDefinition::for_each_object("Characters", nested).with_default("<Character Name>"),
        );

        let tracker = default_tracker(&schema, FieldInclude::All);
        let characters = tracker.get("Characters").and_then(Record::as_map).unwrap();
        assert!(characters.contains_key("<Character Name>"));
    }

    #[test]
    fn test_example_count_follows_max() {
        let schema = TrackerSchema::new()
            .with_field(FieldDefinition::string("Time").with_example("\"09:00\""))
            .with_field(
                FieldDefinition::string("Weather")
                    .with_example("\"Sunny\"")
                    .with_example("\"Rain\""),
            );

        let examples = example_trackers(&schema, FieldInclude::All);
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].get("Weather"), Some(&Record::from("Sunny")));
        assert_eq!(examples[1].get("Weather"), Some(&Record::from("Rain")));
        // Fields with fewer examples fall back to their default.
        assert_eq!(
            examples[1].get("Time").and_then(Record::as_str),
            Some(STRING_PLACEHOLDER)
        );
    }

    #[test]
    fn test_array_example_decodes_json() {
        let schema = TrackerSchema::new()
            .with_field(FieldDefinition::array("Topics").with_example(r#"["fog", "tides"]"#));

        let examples = example_trackers(&schema, FieldInclude::All);
        assert_eq!(
            examples[0].get("Topics"),
            Some(&Record::from(serde_json::json!(["fog", "tides"])))
        );
    }

    #[test]
    fn test_malformed_example_falls_back_to_raw_string() {
        let schema = TrackerSchema::new()
            .with_field(FieldDefinition::array("Topics").with_example("[not json"));

        let examples = example_trackers(&schema, FieldInclude::All);
        assert_eq!(examples[0].get("Topics"), Some(&Record::from("[not json")));
    }

    #[test]
    fn test_include_filter_limits_synthesis() {
        let schema = TrackerSchema::new()
            .with_field(FieldDefinition::string("Name").static_field())
            .with_field(FieldDefinition::string("Time"));

        let tracker = default_tracker(&schema, FieldInclude::Dynamic);
        assert!(tracker.get("Name").is_none());
        assert!(tracker.get("Time").is_some());
    }
}
