//! Error types for template rendering.

use thiserror::Error;

/// Errors that can occur while rendering a template.
///
/// Lookup failures are not errors — unresolved paths render as empty text.
/// Only a structurally broken template aborts rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `{{#if}}` or `{{#foreach}}` block is missing its close tag.
    #[error("unmatched {{{{#{0}}}}}")]
    UnmatchedBlock(String),
}

/// Convenience alias for results with [`TemplateError`].
pub type Result<T> = std::result::Result<T, TemplateError>;
