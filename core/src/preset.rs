//! Bundled starting schema and display template.
//!
//! The default scene schema mirrors the tracker shape the system ships with
//! out of the box: scene-level fields plus a per-character block. It is used
//! by tests and CLI demos and serves as the documented starting point for
//! custom schemas.

use crate::{FieldDefinition, TrackerSchema};

/// Plain-text display template matching [`default_scene_schema`].
pub const DEFAULT_SCENE_TEMPLATE: &str = "\
Time: {{Time}}
Location: {{Location}}
Weather: {{Weather}}
Topics: {{#join \", \" Topics}}
Present: {{#join \", \" CharactersPresent}}
{{#foreach Characters character}}
{{character}}:
  Hair: {{character.Hair}}
  Makeup: {{character.Makeup}}
  Outfit: {{character.Outfit}}
  State: {{character.StateOfDress}}
  Position: {{character.PostureAndInteraction}}
{{/foreach}}";

/// The default scene-tracker schema.
///
/// Three parallel example sets are embedded; `FOR_EACH_OBJECT` example
/// arrays are aligned positionally, so the i-th character name picks up the
/// i-th element of every nested example array.
///
/// # Examples
///
/// ```
/// use scene_tracker_core::*;
///
/// let schema = default_scene_schema();
/// assert!(validate_schema(&schema).is_empty());
/// assert_eq!(schema.max_example_count(), 3);
/// ```
pub fn default_scene_schema() -> TrackerSchema {
    let character = TrackerSchema::new()
        .with_field(
            FieldDefinition::string("Hair")
                .with_prompt("Style and length")
                .with_example(r#"["Shoulder-length blonde hair, styled straight", "Short black hair, neatly combed"]"#)
                .with_example(r#"["Short brown hair, damp with sweat", "Medium-length red hair in a high ponytail"]"#)
                .with_example(r#"["Short sandy blonde hair, slightly tousled", "Long wavy brown hair, loose and flowing"]"#),
        )
        .with_field(
            FieldDefinition::string("Makeup")
                .with_prompt("Current makeup, if any")
                .with_example(r#"["Natural look with light foundation", "None"]"#)
                .with_example(r#"["None", "Minimal, sweat-resistant mascara"]"#)
                .with_example(r#"["None", "Sunscreen applied, no additional makeup"]"#),
        )
        .with_field(
            FieldDefinition::string("Outfit")
                .with_prompt("Complete outfit with color, fabric, and style details; keep it until changed")
                .with_example(r#"["Navy blazer over a white silk blouse; gray pencil skirt; black pumps", "Dark gray suit; light blue shirt; navy striped tie; black dress shoes"]"#)
                .with_example(r#"["Gray moisture-wicking t-shirt; black athletic shorts; gray running shoes", "Black sports tank top; purple leggings; black sneakers"]"#)
                .with_example(r#"["Light blue short-sleeve shirt; khaki shorts; brown leather sandals", "White sundress over a red halter swimsuit; straw hat; flip-flops"]"#),
        )
        .with_field(
            FieldDefinition::string("StateOfDress")
                .with_prompt("How put-together or disheveled the character appears, noting removed items")
                .with_example(r#"["Professionally dressed, neat appearance", "Professionally dressed, attentive"]"#)
                .with_example(r#"["Workout attire, lightly perspiring", "Workout attire, energized"]"#)
                .with_example(r#"["Shirt and sandals removed, placed on beach towel", "Sundress and hat removed, placed on beach chair"]"#),
        )
        .with_field(
            FieldDefinition::string("PostureAndInteraction")
                .with_prompt("Physical posture, position relative to others or objects, and interactions")
                .with_example(r#"["Standing at the podium, presenting slides", "Sitting at the conference table, taking notes"]"#)
                .with_example(r#"["Lifting weights at the bench press", "Running on the treadmill at a steady pace"]"#)
                .with_example(r#"["Standing at the water's edge, feet in the surf", "Lying on a beach towel, sunbathing"]"#),
        );

    TrackerSchema::new()
        .with_field(
            FieldDefinition::string("Time")
                .with_prompt("Use the 24-hour format \"HH:MM:SS; MM/DD/YYYY (Day Name)\"; adjust in small increments")
                .with_default("<Updated time if changed>")
                .with_example(r#""09:15:30; 10/16/2024 (Wednesday)""#)
                .with_example(r#""18:45:50; 10/16/2024 (Wednesday)""#)
                .with_example(r#""15:10:20; 10/16/2024 (Wednesday)""#),
        )
        .with_field(
            FieldDefinition::string("Location")
                .with_prompt("Specific place, building, city, state")
                .with_default("<Updated location if changed>")
                .with_example(r#""Conference Room B, 12th Floor, Apex Corporation, New York, NY""#)
                .with_example(r#""Main Gym Hall, Maple Street Fitness Center, Denver, CO""#)
                .with_example(r#""South Beach, Miami, FL""#),
        )
        .with_field(
            FieldDefinition::string("Weather")
                .with_prompt("Concise description of the current weather")
                .with_default("<Updated weather if changed>")
                .with_example(r#""Overcast, mild temperature""#)
                .with_example(r#""Clear skies, warm evening""#)
                .with_example(r#""Sunny, gentle sea breeze""#),
        )
        .with_field(
            FieldDefinition::array("Topics")
                .with_prompt("One- or two-word topics relevant to the scene")
                .with_example(r#"["presentation", "quarterly report"]"#)
                .with_example(r#"["workout", "training"]"#)
                .with_example(r#"["relaxation", "swimming"]"#),
        )
        .with_field(
            FieldDefinition::array("CharactersPresent")
                .with_prompt("All characters currently present")
                .with_example(r#"["Emma Thompson", "James Miller"]"#)
                .with_example(r#"["Daniel Lee", "Olivia Harris"]"#)
                .with_example(r#"["Liam Johnson", "Emily Clark"]"#),
        )
        .with_field(
            FieldDefinition::for_each_object("Characters", character)
                .with_prompt("One entry per present character")
                .with_default("<Character Name>")
                .with_example(r#"["Emma Thompson", "James Miller"]"#)
                .with_example(r#"["Daniel Lee", "Olivia Harris"]"#)
                .with_example(r#"["Liam Johnson", "Emily Clark"]"#),
        )
}
