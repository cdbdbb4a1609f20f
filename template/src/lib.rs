//! Template rendering for scene trackers.
//!
//! A small, self-contained templating language used to project a tracker
//! record into display text. Two phases:
//!
//! - [`tokenize`] — slices a template into [`Token`]s: literal text,
//!   variables, block openers, and block closers.
//! - [`render`] — interprets the token stream against a
//!   [`Record`](scene_tracker_core::Record), handling `{{variable.path}}`
//!   interpolation, `{{#if}}`/`{{#foreach}}` blocks, and the self-closing
//!   `{{#join}}` directive.
//!
//! Rendering is a pure transform. Unresolvable paths render as empty text;
//! the only fatal condition is an open block with no matching close tag.
//!
//! # Example
//!
//! ```
//! use scene_tracker_core::Record;
//! use scene_tracker_template::render;
//!
//! let record = Record::from(serde_json::json!({
//!     "Location": "Pier 39",
//!     "Characters": {"Ava": {"Hair": "short"}, "Bea": {"Hair": "long"}}
//! }));
//!
//! let template = "\
//! At {{Location}}:
//! {{#foreach Characters c}}- {{c}} ({{c.Hair}} hair)
//! {{/foreach}}";
//!
//! let text = render(template, &record).unwrap();
//! assert_eq!(text, "At Pier 39:\n- Ava (short hair)\n- Bea (long hair)\n");
//! ```

mod error;
mod render;
mod token;

pub use error::{Result, TemplateError};
pub use render::render;
pub use token::{Token, tokenize};
