//! Template interpretation.
//!
//! The interpreter walks the token stream against a record and a lookup
//! scope, concatenating output text. Supported directives:
//!
//! - `{{path.to.value}}` — dotted-path interpolation; unresolved paths
//!   render as empty text.
//! - `{{#if condition}}...{{/if}}` — renders the block iff the condition
//!   path resolves to a truthy value. Nests.
//! - `{{#foreach collection item}}...{{/foreach}}` — iterates a sequence or
//!   a map in order, extending the scope with the item and its companion
//!   `itemIndex`/`itemKey` entry. Nests.
//! - `{{#join sep path}}` — joins a sequence's elements with a separator;
//!   self-closing.
//!
//! An open block with no matching close tag is a fatal
//! [`TemplateError::UnmatchedBlock`]; everything else degrades gracefully.

use std::collections::HashMap;

use scene_tracker_core::Record;
use tracing::debug;

use crate::error::{Result, TemplateError};
use crate::token::{Token, tokenize};

/// Renders a template against a record.
///
/// # Examples
///
/// ```
/// use scene_tracker_core::Record;
/// use scene_tracker_template::render;
///
/// let record = Record::from(serde_json::json!({"name": "Ava"}));
/// assert_eq!(render("Hello {{name}}!", &record).unwrap(), "Hello Ava!");
/// ```
///
/// Unterminated blocks abort rendering:
///
/// ```
/// use scene_tracker_core::Record;
/// use scene_tracker_template::{TemplateError, render};
///
/// let record = Record::from(serde_json::json!({"x": "1"}));
/// assert_eq!(
///     render("{{#if x}}no end", &record),
///     Err(TemplateError::UnmatchedBlock("if".to_string()))
/// );
/// ```
pub fn render(template: &str, record: &Record) -> Result<String> {
    debug!(template_len = template.len(), "rendering template");
    let tokens = tokenize(template);
    render_tokens(&tokens, record, &Scope::default())
}

/// Lookup scope for loop variables.
///
/// `current_item` remembers the innermost loop's item name: a bare variable
/// reference to that name whose value is a container resolves to the
/// companion key/index entry instead, so `{{c}}` inside
/// `{{#foreach Characters c}}` prints the character's name.
#[derive(Debug, Clone, Default)]
struct Scope {
    vars: HashMap<String, Record>,
    current_item: Option<String>,
}

impl Scope {
    fn for_element(&self, item: &str, value: Record, index: usize) -> Scope {
        let mut vars = self.vars.clone();
        vars.insert(item.to_string(), value);
        vars.insert(format!("{item}Index"), Record::Str(index.to_string()));
        Scope {
            vars,
            current_item: Some(item.to_string()),
        }
    }

    fn for_entry(&self, item: &str, value: Record, key: &str) -> Scope {
        let mut vars = self.vars.clone();
        vars.insert(item.to_string(), value);
        vars.insert(format!("{item}Key"), Record::Str(key.to_string()));
        Scope {
            vars,
            current_item: Some(item.to_string()),
        }
    }
}

fn render_tokens(tokens: &[Token], record: &Record, scope: &Scope) -> Result<String> {
    let mut output = String::new();
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Text(text) => {
                output.push_str(text);
                i += 1;
            }
            Token::Variable(path) => {
                if let Some(value) = lookup(path, record, scope) {
                    output.push_str(&display_value(&value));
                }
                i += 1;
            }
            // Close tags are consumed during block extraction; a stray one
            // is a no-op.
            Token::End { .. } => {
                i += 1;
            }
            Token::Start { tag, params } => {
                i += 1;
                match tag.as_str() {
                    "if" => {
                        let (inner, next) = extract_inner(tokens, i, "if")?;
                        let truthy = lookup(params.trim(), record, scope)
                            .is_some_and(|value| value.is_truthy());
                        if truthy {
                            output.push_str(&render_tokens(inner, record, scope)?);
                        }
                        i = next;
                    }
                    "foreach" => {
                        let (inner, next) = extract_inner(tokens, i, "foreach")?;
                        let mut parts = params.trim().split_whitespace();
                        let collection_path = parts.next().unwrap_or_default();
                        let item_name = parts.next().unwrap_or_default();

                        match lookup(collection_path, record, scope) {
                            Some(Record::Seq(items)) => {
                                for (index, item) in items.iter().enumerate() {
                                    let loop_scope =
                                        scope.for_element(item_name, item.clone(), index);
                                    output.push_str(&render_tokens(inner, record, &loop_scope)?);
                                }
                            }
                            Some(Record::Map(entries)) => {
                                for (key, value) in &entries {
                                    let loop_scope = scope.for_entry(item_name, value.clone(), key);
                                    output.push_str(&render_tokens(inner, record, &loop_scope)?);
                                }
                            }
                            // Absent or non-container: zero iterations.
                            _ => {}
                        }
                        i = next;
                    }
                    "join" => {
                        let (separator, path) = parse_join_params(params);
                        if let Some(Record::Seq(items)) = lookup(&path, record, scope) {
                            let joined = items
                                .iter()
                                .map(display_value)
                                .collect::<Vec<_>>()
                                .join(&separator);
                            output.push_str(&joined);
                        }
                        // join is self-closing; no end tag to consume.
                    }
                    // Unknown directives fall through silently.
                    _ => {}
                }
            }
        }
    }

    Ok(output)
}

/// Slices out the tokens between `start` and the matching close tag,
/// counting nested blocks of the same tag. Returns the inner span and the
/// index just past the close tag.
fn extract_inner<'t>(tokens: &'t [Token], start: usize, tag: &str) -> Result<(&'t [Token], usize)> {
    let mut depth = 1usize;
    let mut i = start;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Start { tag: open, .. } if open == tag => depth += 1,
            Token::End { tag: close } if close == tag => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&tokens[start..i], i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }

    Err(TemplateError::UnmatchedBlock(tag.to_string()))
}

/// Separator and array path of a `join` directive: either a quoted literal
/// followed by the path, or the first whitespace token with the rest as the
/// path.
fn parse_join_params(params: &str) -> (String, String) {
    let trimmed = params.trim();

    if let Some(quote) = trimmed.chars().next().filter(|c| *c == '"' || *c == '\'') {
        if let Some(end) = trimmed[1..].find(quote) {
            let separator = trimmed[1..1 + end].to_string();
            let rest = trimmed[2 + end..].trim_start();
            if !rest.is_empty() {
                return (separator, rest.to_string());
            }
        }
    }

    let mut parts = trimmed.split_whitespace();
    let separator = parts.next().unwrap_or_default().to_string();
    let path = parts.collect::<Vec<_>>().join(" ");
    (separator, path)
}

/// Resolves a dotted path against the scope (first segment only) and the
/// record, walking map keys. Returns `None` as soon as a segment is missing
/// or the current value is not a map.
fn lookup(path: &str, record: &Record, scope: &Scope) -> Option<Record> {
    let mut segments = path.split('.');
    let first = segments.next()?;

    let mut value = match scope.vars.get(first) {
        Some(scoped) => scoped.clone(),
        None => record.get(first)?.clone(),
    };

    // A bare reference to the current loop item that holds a container
    // resolves to its key/index companion instead of the container itself.
    if !path.contains('.') && scope.current_item.as_deref() == Some(first) && !value.is_str() {
        let companion = scope
            .vars
            .get(&format!("{first}Key"))
            .or_else(|| scope.vars.get(&format!("{first}Index")));
        return Some(
            companion
                .cloned()
                .unwrap_or_else(|| Record::Str(String::new())),
        );
    }

    for segment in segments {
        value = value.get(segment)?.clone();
    }

    Some(value)
}

/// Text form of a resolved value: strings verbatim, sequences joined with
/// commas, maps rendered as compact JSON.
fn display_value(value: &Record) -> String {
    match value {
        Record::Str(s) => s.clone(),
        Record::Seq(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Record::Map(_) => value.to_json_string(),
    }
}
