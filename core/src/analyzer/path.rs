//! # Path Templates
//!
//! Tokenizes OpenAPI path templates into literal and variable segments.

use std::sync::OnceLock;

use regex::Regex;

/// Segments that never name a resource.
pub const NON_RESOURCE_SEGMENTS: [&str; 8] =
    ["api", "v1", "v2", "v3", "version", "health", "status", "ping"];

/// One token of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    /// Literal text, e.g. `users` or the `move` of `{id}:move`.
    Literal(String),
    /// A `{name}` placeholder.
    Variable(String),
}

impl PathToken {
    /// The literal text, if this is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            PathToken::Literal(s) => Some(s),
            PathToken::Variable(_) => None,
        }
    }

    /// True for placeholders.
    pub fn is_variable(&self) -> bool {
        matches!(self, PathToken::Variable(_))
    }
}

fn variable_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("Invalid regex"))
}

/// Splits a path template into tokens.
///
/// Raw segments are split on `/`. Inside a raw segment, `{...}` placeholders
/// become [`PathToken::Variable`]s and the text around them is further split
/// on `:` so that custom-method suffixes (`tasks:batchGet`, `{id}:move`) show
/// up as literals of their own.
pub fn tokenize(path: &str) -> Vec<PathToken> {
    let re = variable_regex();
    let mut tokens = Vec::new();

    for raw in path.split('/') {
        let mut cursor = 0;
        for caps in re.captures_iter(raw) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            push_literals(&raw[cursor..whole.start()], &mut tokens);
            let name = caps.get(1).map_or("", |m| m.as_str());
            tokens.push(PathToken::Variable(name.to_string()));
            cursor = whole.end();
        }
        push_literals(&raw[cursor..], &mut tokens);
    }
    tokens
}

fn push_literals(text: &str, tokens: &mut Vec<PathToken>) {
    tokens.extend(
        text.split(':')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| PathToken::Literal(part.to_string())),
    );
}

/// Placeholder names in order of appearance.
pub fn path_variables(path: &str) -> Vec<String> {
    variable_regex()
        .captures_iter(path)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Whether a literal segment can name a resource.
pub fn is_resource_segment(segment: &str) -> bool {
    !NON_RESOURCE_SEGMENTS.contains(&segment)
}
