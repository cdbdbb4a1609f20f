//! Schema validation.
//!
//! Validates structural invariants of tracker schemas before they are handed
//! to the reconciliation engine: non-empty field names, name uniqueness per
//! nesting level, and the nested-fields rule (`OBJECT` and `FOR_EACH_OBJECT`
//! require a child schema, the scalar kinds must not carry one).
//!
//! # Examples
//!
//! ```
//! use scene_tracker_core::*;
//!
//! let schema = TrackerSchema::new()
//!     .with_field(FieldDefinition::string("Time"))
//!     .with_field(FieldDefinition::for_each_object(
//!         "Characters",
//!         TrackerSchema::new().with_field(FieldDefinition::string("Hair")),
//!     ));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Invalid: FOR_EACH_OBJECT without nested fields.
//! let mut bad = FieldDefinition::string("Characters");
//! bad.kind = FieldKind::ForEachObject;
//! let errors = validate_schema(&TrackerSchema::new().with_field(bad));
//! assert!(!errors.is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::TrackerSchema;

/// Schema validation errors.
///
/// Each variant names the offending field by its dotted path from the schema
/// root (e.g. `Characters.Hair`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A field has an empty or whitespace-only name.
    #[error("field name cannot be empty (under '{0}')")]
    EmptyFieldName(String),
    /// Two fields at the same nesting level share a name.
    #[error("duplicate field in scope: {0}")]
    DuplicateField(String),
    /// An `OBJECT`/`FOR_EACH_OBJECT` field has no nested schema.
    #[error("field '{0}' requires nested fields")]
    MissingNestedFields(String),
    /// A scalar field carries a nested schema.
    #[error("field '{0}' does not take nested fields")]
    UnexpectedNestedFields(String),
    /// An `OBJECT`/`FOR_EACH_OBJECT` field has an empty nested schema.
    #[error("field '{0}' has an empty nested schema")]
    EmptyNestedFields(String),
}

/// Validates a tracker schema, returning every structural problem found.
///
/// An empty result means the schema is safe to reconcile against. The engine
/// itself does not re-validate per call.
///
/// # Examples
///
/// ```
/// use scene_tracker_core::*;
///
/// let schema = TrackerSchema::new()
///     .with_field(FieldDefinition::string("Time"))
///     .with_field(FieldDefinition::array("Topics"));
/// assert!(validate_schema(&schema).is_empty());
/// ```
pub fn validate_schema(schema: &TrackerSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_level(schema, &mut Vec::new(), &mut errors);
    errors
}

fn validate_level(schema: &TrackerSchema, path: &mut Vec<String>, errors: &mut Vec<ValidationError>) {
    let mut seen: HashSet<&str> = HashSet::new();

    for field in schema.fields() {
        let name = field.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyFieldName(join_path(path, "")));
            continue;
        }

        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateField(join_path(path, name)));
        }

        match (&field.nested_fields, field.kind.has_nested_fields()) {
            (None, true) => {
                errors.push(ValidationError::MissingNestedFields(join_path(path, name)));
            }
            (Some(_), false) => {
                errors.push(ValidationError::UnexpectedNestedFields(join_path(path, name)));
            }
            (Some(nested), true) => {
                if nested.is_empty() {
                    errors.push(ValidationError::EmptyNestedFields(join_path(path, name)));
                } else {
                    path.push(name.to_string());
                    validate_level(nested, path, errors);
                    path.pop();
                }
            }
            (None, false) => {}
        }
    }
}

fn join_path(path: &[String], name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        path.join(".")
    } else {
        format!("{}.{}", path.join("."), name)
    }
}
