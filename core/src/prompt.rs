//! Flattening a schema into instructional prompt text.

use crate::{FieldInclude, TrackerSchema};

/// Flattens a schema into one bullet line per included field.
///
/// Each line reads `- **name:** prompt`, indented two spaces per nesting
/// level. Fields with neither a prompt nor nested fields are skipped; fields
/// with nested schemas emit their own bullet (prompt optional) and then
/// recurse.
///
/// # Examples
///
/// ```
/// use scene_tracker_core::*;
///
/// let character = TrackerSchema::new()
///     .with_field(FieldDefinition::string("Hair").with_prompt("Style and length"));
/// let schema = TrackerSchema::new()
///     .with_field(FieldDefinition::string("Time").with_prompt("Current scene time"))
///     .with_field(
///         FieldDefinition::for_each_object("Characters", character)
///             .with_prompt("One entry per present character"),
///     );
///
/// let text = schema_prompt(&schema, FieldInclude::All);
/// let lines: Vec<&str> = text.lines().collect();
/// assert_eq!(lines[0], "- **Time:** Current scene time");
/// assert_eq!(lines[1], "- **Characters:** One entry per present character");
/// assert_eq!(lines[2], "  - **Hair:** Style and length");
/// ```
pub fn schema_prompt(schema: &TrackerSchema, include: FieldInclude) -> String {
    let mut lines = Vec::new();
    build_prompt(schema, include, 0, &mut lines);
    lines.join("\n").trim().to_string()
}

fn build_prompt(schema: &TrackerSchema, include: FieldInclude, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for field in schema.fields() {
        if !include.includes(field.is_dynamic) {
            continue;
        }
        if field.prompt.is_none() && field.nested_fields.is_none() {
            continue;
        }

        match &field.nested_fields {
            Some(nested) => {
                let prompt = field
                    .prompt
                    .as_deref()
                    .map(|p| format!(" {p}"))
                    .unwrap_or_default();
                lines.push(format!("{indent}- **{}:**{prompt}", field.name));
                build_prompt(nested, include, depth + 1, lines);
            }
            None => {
                let prompt = field.prompt.as_deref().unwrap_or_default();
                lines.push(format!("{indent}- **{}:** {prompt}", field.name));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::FieldDefinition;

    use super::*;

    #[test]
    fn test_prompt_skips_fields_without_prompt_or_children() {
        let schema = TrackerSchema::new()
            .with_field(FieldDefinition::string("Time").with_prompt("Scene time"))
            .with_field(FieldDefinition::string("Silent"));

        let text = schema_prompt(&schema, FieldInclude::All);
        assert_eq!(text, "- **Time:** Scene time");
    }

    #[test]
    fn test_prompt_indents_nested_levels() {
        let outfit = TrackerSchema::new()
            .with_field(FieldDefinition::string("Top").with_prompt("Upper body"));
        let character = TrackerSchema::new()
            .with_field(FieldDefinition::object("Outfit", outfit).with_prompt("Worn clothing"));
        let schema =
            TrackerSchema::new().with_field(FieldDefinition::for_each_object("Characters", character));

        let text = schema_prompt(&schema, FieldInclude::All);
        assert_eq!(
            text,
            "- **Characters:**\n  - **Outfit:** Worn clothing\n    - **Top:** Upper body"
        );
    }

    #[test]
    fn test_prompt_respects_include_filter() {
        let schema = TrackerSchema::new()
            .with_field(FieldDefinition::string("Name").with_prompt("Who").static_field())
            .with_field(FieldDefinition::string("Time").with_prompt("When"));

        assert_eq!(
            schema_prompt(&schema, FieldInclude::Dynamic),
            "- **Time:** When"
        );
        assert_eq!(
            schema_prompt(&schema, FieldInclude::Static),
            "- **Name:** Who"
        );
    }
}
