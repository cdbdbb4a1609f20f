//! Schema reconciliation engine for scene trackers.
//!
//! This crate defines the declarative schema model and the engine that keeps
//! loosely-typed tracker records in line with it:
//!
//! - [`TrackerSchema`] / [`FieldDefinition`] — ordered, recursively nested
//!   description of expected tracker shape.
//! - [`Record`] — the untyped value tree trackers travel as (string,
//!   sequence, or ordered map).
//! - [`reconcile_tracker`] — coerces a record into schema shape, diverting
//!   unclaimed or wrong-shaped data into the `_extraFields` side channel
//!   instead of dropping it.
//! - [`update_tracker`] — merges a new, possibly partial, tracker into a
//!   previous one field by field.
//! - [`default_tracker`] / [`example_trackers`] — synthesize records from
//!   the schema alone.
//! - [`schema_prompt`] — flattens a schema into instructional bullet text.
//!
//! Validation ([`validate_schema`]) catches structural schema errors before
//! they reach the engine. The engine itself never fails on data: shape
//! problems are routed to extras and the output always carries every
//! included field.
//!
//! Everything here is a pure, synchronous transform: no I/O, no shared
//! state, fresh output structures on every call.
//!
//! # Example
//!
//! ```
//! use scene_tracker_core::*;
//!
//! let schema = TrackerSchema::new()
//!     .with_field(FieldDefinition::string("Time").with_default("00:00:00"))
//!     .with_field(FieldDefinition::array("Topics"));
//!
//! let raw = Record::from(serde_json::json!({
//!     "Time": "21:14:05",
//!     "Topics": ["storm", "harbor"],
//!     "Omen": "red sky"
//! }));
//!
//! let tracker = reconcile_tracker(&raw, &schema, FieldInclude::All, true);
//! assert_eq!(tracker.get("Time").and_then(Record::as_str), Some("21:14:05"));
//! assert_eq!(
//!     tracker.get("_extraFields").and_then(|e| e.get("Omen")),
//!     Some(&Record::from("red sky"))
//! );
//! ```

mod merge;
mod preset;
mod prompt;
mod reconcile;
mod synthesize;
mod types;
mod validate;
mod value;

pub use merge::update_tracker;
pub use preset::{DEFAULT_SCENE_TEMPLATE, default_scene_schema};
pub use prompt::schema_prompt;
pub use reconcile::{EXTRA_FIELDS_KEY, reconcile_tracker};
pub use synthesize::{default_tracker, example_trackers};
pub use types::{FieldDefinition, FieldInclude, FieldKind, TrackerSchema};
pub use validate::{ValidationError, validate_schema};
pub use value::Record;
