//! Schema type definitions for tracker structure modeling.
//!
//! This module defines the declarative data model used to describe the shape
//! of a scene tracker. The types are designed for serialization with
//! [`serde`] and round-trip through JSON and YAML schema files.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Record;

/// Which fields to include when traversing a schema.
///
/// A field is included iff the mode is [`All`](FieldInclude::All) or the mode
/// matches the field's `is_dynamic` flag. The filter is applied independently
/// at every nesting level.
///
/// # Examples
///
/// ```
/// use scene_tracker_core::FieldInclude;
///
/// assert!(FieldInclude::All.includes(false));
/// assert!(FieldInclude::Dynamic.includes(true));
/// assert!(!FieldInclude::Dynamic.includes(false));
/// assert!(FieldInclude::Static.includes(false));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldInclude {
    /// Only fields expected to change turn over turn (the default).
    #[default]
    Dynamic,
    /// Only identity-like fields that rarely change.
    Static,
    /// Every field.
    All,
}

impl FieldInclude {
    /// Whether a field with the given `is_dynamic` flag passes this filter.
    pub fn includes(self, is_dynamic: bool) -> bool {
        match self {
            FieldInclude::All => true,
            FieldInclude::Dynamic => is_dynamic,
            FieldInclude::Static => !is_dynamic,
        }
    }
}

/// Declared shape of a tracker field.
///
/// The set is closed; dispatch over it is an exhaustive `match`, with no
/// open-ended handler registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    /// A scalar string value (the default).
    #[default]
    String,
    /// An ordered sequence of values.
    Array,
    /// A mapping with a fixed nested schema.
    ///
    /// `ARRAY_OBJECT` is accepted as a legacy alias.
    #[serde(alias = "ARRAY_OBJECT")]
    Object,
    /// A mapping whose keys are runtime-determined entity names (e.g.
    /// character names) and whose values each conform to one nested schema.
    ForEachObject,
}

impl FieldKind {
    /// Whether this kind carries a nested schema.
    pub fn has_nested_fields(self) -> bool {
        matches!(self, FieldKind::Object | FieldKind::ForEachObject)
    }
}

/// Schema for a single tracker field.
///
/// Use the constructor methods [`string`](FieldDefinition::string),
/// [`array`](FieldDefinition::array), [`object`](FieldDefinition::object),
/// and [`for_each_object`](FieldDefinition::for_each_object) to create
/// fields, then chain builder methods like
/// [`with_prompt`](FieldDefinition::with_prompt).
///
/// # Examples
///
/// ```
/// use scene_tracker_core::{FieldDefinition, FieldKind};
///
/// let time = FieldDefinition::string("Time")
///     .with_prompt("Current scene time")
///     .with_default("00:00:00");
/// assert_eq!(time.kind, FieldKind::String);
/// assert!(time.is_dynamic);
/// assert_eq!(time.default_str(), Some("00:00:00"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Field name, unique within its enclosing schema level.
    pub name: String,
    /// Declared shape of the field's value.
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    /// Whether the field is expected to change turn over turn.
    #[serde(default)]
    pub is_dynamic: bool,
    /// Fallback value used when no other value is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Record>,
    /// Serialized example values, one per example-set index.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub example_values: Vec<String>,
    /// Child schema, present for `OBJECT` and `FOR_EACH_OBJECT` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_fields: Option<TrackerSchema>,
    /// Human-readable description used when flattening the schema into
    /// instructional text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl FieldDefinition {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            is_dynamic: true,
            default_value: None,
            example_values: Vec::new(),
            nested_fields: None,
            prompt: None,
        }
    }

    /// Creates a `STRING` field.
    pub fn string(name: &str) -> Self {
        Self::new(name, FieldKind::String)
    }

    /// Creates an `ARRAY` field.
    pub fn array(name: &str) -> Self {
        Self::new(name, FieldKind::Array)
    }

    /// Creates an `OBJECT` field with the given nested schema.
    pub fn object(name: &str, nested: TrackerSchema) -> Self {
        let mut field = Self::new(name, FieldKind::Object);
        field.nested_fields = Some(nested);
        field
    }

    /// Creates a `FOR_EACH_OBJECT` field with the given nested schema.
    pub fn for_each_object(name: &str, nested: TrackerSchema) -> Self {
        let mut field = Self::new(name, FieldKind::ForEachObject);
        field.nested_fields = Some(nested);
        field
    }

    /// Sets the prompt text.
    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = Some(prompt.to_string());
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: impl Into<Record>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Appends a serialized example value.
    pub fn with_example(mut self, example: &str) -> Self {
        self.example_values.push(example.to_string());
        self
    }

    /// Marks the field as static (identity-like, rarely changing).
    pub fn static_field(mut self) -> Self {
        self.is_dynamic = false;
        self
    }

    /// The default value as a string, if it is one.
    pub fn default_str(&self) -> Option<&str> {
        self.default_value.as_ref().and_then(Record::as_str)
    }
}

/// A declarative, ordered description of expected tracker shape.
///
/// Fields are kept in declaration order; reconciled trackers emit their
/// fields in exactly this order. The schema is read-only input to the engine
/// and is never mutated by it.
///
/// # Examples
///
/// ```
/// use scene_tracker_core::{FieldDefinition, TrackerSchema};
///
/// let schema = TrackerSchema::new()
///     .with_field(FieldDefinition::string("Time").with_example("\"09:00\""))
///     .with_field(FieldDefinition::array("Topics"));
///
/// assert_eq!(schema.len(), 2);
/// assert!(schema.get("Topics").is_some());
/// assert_eq!(schema.max_example_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackerSchema {
    fields: IndexMap<String, FieldDefinition>,
}

impl TrackerSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, keyed by its name.
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Iterates the field definitions in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    /// Finds a field definition by name.
    ///
    /// Lookup scans by the definition's `name`, not the serialized map key:
    /// schema files in the wild key fields by positional indexes.
    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.values().find(|field| field.name == name)
    }

    /// Whether a field with the given name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of fields at this level.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether this level declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The largest `example_values` length anywhere in the schema tree.
    ///
    /// Determines how many parallel example trackers
    /// [`example_trackers`](crate::example_trackers) synthesizes.
    pub fn max_example_count(&self) -> usize {
        let mut max = 0;
        for field in self.fields.values() {
            max = max.max(field.example_values.len());
            if let Some(nested) = &field.nested_fields {
                max = max.max(nested.max_example_count());
            }
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_builders() {
        let field = FieldDefinition::string("Weather")
            .with_prompt("Current weather")
            .with_default("Clear skies")
            .static_field();

        assert_eq!(field.name, "Weather");
        assert_eq!(field.kind, FieldKind::String);
        assert!(!field.is_dynamic);
        assert_eq!(field.default_str(), Some("Clear skies"));
        assert_eq!(field.prompt.as_deref(), Some("Current weather"));
    }

    #[test]
    fn test_kind_deserializes_wire_names() {
        let kind: FieldKind = serde_json::from_str("\"FOR_EACH_OBJECT\"").unwrap();
        assert_eq!(kind, FieldKind::ForEachObject);

        // Legacy alias maps onto OBJECT.
        let kind: FieldKind = serde_json::from_str("\"ARRAY_OBJECT\"").unwrap();
        assert_eq!(kind, FieldKind::Object);
    }

    #[test]
    fn test_schema_lookup_by_field_name_not_map_key() {
        let json = r#"{
            "0": {"name": "Time", "type": "STRING", "isDynamic": true},
            "1": {"name": "Topics", "type": "ARRAY", "isDynamic": true}
        }"#;
        let schema: TrackerSchema = serde_json::from_str(json).unwrap();
        assert!(schema.get("Time").is_some());
        assert!(schema.get("Topics").is_some());
        assert!(schema.get("0").is_none());
    }

    #[test]
    fn test_max_example_count_recurses() {
        let nested = TrackerSchema::new().with_field(
            FieldDefinition::string("Hair")
                .with_example("[\"a\"]")
                .with_example("[\"b\"]")
                .with_example("[\"c\"]"),
        );
        let schema = TrackerSchema::new()
            .with_field(FieldDefinition::string("Time").with_example("\"09:00\""))
            .with_field(FieldDefinition::for_each_object("Characters", nested));

        assert_eq!(schema.max_example_count(), 3);
    }

    #[test]
    fn test_include_filter() {
        let dynamic = FieldDefinition::string("Time");
        let fixed = FieldDefinition::string("Name").static_field();

        assert!(FieldInclude::Dynamic.includes(dynamic.is_dynamic));
        assert!(!FieldInclude::Dynamic.includes(fixed.is_dynamic));
        assert!(FieldInclude::Static.includes(fixed.is_dynamic));
        assert!(FieldInclude::All.includes(fixed.is_dynamic));
    }
}
