//! Template tokenization.
//!
//! The tokenizer scans left to right for `{{ ... }}` placeholders and slices
//! everything between them into literal text tokens. Placeholders carry an
//! optional leading close marker (`/`), an optional block marker (`#`), a
//! dotted tag name, and optional trailing parameter text. No block nesting
//! is interpreted here; matching open and close tags is the interpreter's
//! job.

use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(/?)\s*(#?)\s*([\w.]+)(?:\s+([^}]*?))?\s*\}\}")
        .expect("static regex must compile")
});

/// One lexical unit of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text between placeholders.
    Text(String),
    /// A block opener such as `{{#if condition}}` or `{{#join ", " Topics}}`.
    Start {
        /// Directive name (`if`, `foreach`, `join`, ...).
        tag: String,
        /// Raw parameter text following the tag, if any.
        params: String,
    },
    /// A block closer such as `{{/if}}`.
    End {
        /// Directive name being closed.
        tag: String,
    },
    /// A dotted-path variable lookup such as `{{character.Hair}}`.
    Variable(String),
}

/// Splits a template string into tokens.
///
/// # Examples
///
/// ```
/// use scene_tracker_template::{Token, tokenize};
///
/// let tokens = tokenize("Hi {{name}}{{#if mood}}!{{/if}}");
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Text("Hi ".to_string()),
///         Token::Variable("name".to_string()),
///         Token::Start { tag: "if".to_string(), params: "mood".to_string() },
///         Token::Text("!".to_string()),
///         Token::End { tag: "if".to_string() },
///     ]
/// );
/// ```
pub fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let placeholder = caps.get(0).expect("whole match always present");

        if placeholder.start() > cursor {
            tokens.push(Token::Text(template[cursor..placeholder.start()].to_string()));
        }

        let closing = !caps[1].is_empty();
        let block = !caps[2].is_empty();
        let tag = caps[3].to_string();
        let params = caps.get(4).map(|m| m.as_str().to_string()).unwrap_or_default();

        if closing {
            tokens.push(Token::End { tag });
        } else if block {
            tokens.push(Token::Start { tag, params });
        } else {
            tokens.push(Token::Variable(tag));
        }

        cursor = placeholder.end();
    }

    if cursor < template.len() {
        tokens.push(Token::Text(template[cursor..].to_string()));
    }

    tokens
}
