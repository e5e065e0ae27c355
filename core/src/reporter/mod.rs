#![deny(missing_docs)]

//! # Reporter
//!
//! Renders an [`ApiAnalysis`] as Markdown, pretty JSON or a condensed text
//! digest meant for language-model context windows.

use std::cmp::Ordering;
use std::fmt;

use crate::error::AppResult;
use crate::models::{ApiAnalysis, HttpMethod, Operation};

/// Condensed text rendering.
pub mod ai;
/// Markdown rendering.
pub mod markdown;

/// Output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Human-oriented Markdown with a Mermaid relationship diagram.
    #[default]
    Markdown,
    /// The analysis serialized as pretty-printed JSON.
    Json,
    /// Compact text digest.
    Ai,
}

impl OutputFormat {
    /// Lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
            OutputFormat::Ai => "ai",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders `analysis` in the requested format.
pub fn render(analysis: &ApiAnalysis, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Markdown => Ok(markdown::render_markdown(analysis)),
        OutputFormat::Json => render_json(analysis),
        OutputFormat::Ai => Ok(ai::render_ai(analysis)),
    }
}

/// Pretty JSON with camelCase keys.
pub fn render_json(analysis: &ApiAnalysis) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(analysis)?)
}

/// Cuts `text` to at most `max` characters, marking the cut with `...`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Escapes table cell separators.
pub(crate) fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn method_rank(method: HttpMethod) -> u8 {
    match method {
        HttpMethod::Get => 0,
        HttpMethod::Post => 1,
        HttpMethod::Put => 2,
        HttpMethod::Patch => 3,
        HttpMethod::Delete => 4,
        _ => 5,
    }
}

/// Display order: GET, POST, PUT, PATCH, DELETE, others; then by path.
pub(crate) fn compare_operations(a: &Operation, b: &Operation) -> Ordering {
    method_rank(a.method)
        .cmp(&method_rank(b.method))
        .then_with(|| a.method.cmp(&b.method))
        .then_with(|| a.path.cmp(&b.path))
}

/// Operations of a resource in display order.
pub(crate) fn sorted_operations(operations: &[Operation]) -> Vec<&Operation> {
    let mut sorted: Vec<&Operation> = operations.iter().collect();
    sorted.sort_by(|a, b| compare_operations(a, b));
    sorted
}
