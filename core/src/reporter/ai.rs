//! Condensed plain-text rendering.

use crate::analyzer::relationship::sorted_relationships;
use crate::models::{ApiAnalysis, HttpMethod, Operation};
use crate::reporter::{sorted_operations, truncate};

const SUMMARY_WIDTH: usize = 60;
const MEANINGFUL_SUMMARY: usize = 10;

/// Renders the digest: header, stats, resources, patterns and key operations.
pub fn render_ai(analysis: &ApiAnalysis) -> String {
    let mut out = String::new();
    let stats = &analysis.summary;

    out.push_str(&format!(
        "API: {} v{} ({})\n",
        analysis.title, analysis.version, analysis.spec_type
    ));
    out.push_str(&format!(
        "Stats: {} resources, {} operations, {} endpoints\n\n",
        stats.total_resources, stats.total_operations, stats.total_endpoints
    ));

    out.push_str("RESOURCES:\n");
    for resource in &analysis.resources {
        out.push_str(&format!(
            "- {} ({} ops)",
            resource.name,
            resource.operations.len()
        ));
        let relationships: Vec<String> = sorted_relationships(resource)
            .into_iter()
            .map(|rel| format!("{}:{}", rel.kind, rel.resource))
            .collect();
        if !relationships.is_empty() {
            out.push_str(&format!(" -> {}", relationships.join(", ")));
        }
        out.push('\n');
    }

    if !analysis.patterns.is_empty() {
        out.push_str("\nPATTERNS:\n");
        for pattern in &analysis.patterns {
            out.push_str(&format!(
                "- {} ({}): {}\n",
                pattern.kind, pattern.confidence, pattern.description
            ));
        }
    }

    out.push_str("\nKEY OPERATIONS:\n");
    for resource in &analysis.resources {
        for op in sorted_operations(&resource.operations) {
            if !is_key_operation(op) {
                continue;
            }
            out.push_str(&format!("- {} {}", op.method, op.path));
            if let Some(summary) = op.summary.as_deref().filter(|s| !s.is_empty()) {
                out.push_str(&format!(" ({})", truncate(summary, SUMMARY_WIDTH)));
            }
            out.push('\n');
        }
    }

    out
}

/// CRUD verbs, or anything with a summary longer than a few words.
fn is_key_operation(op: &Operation) -> bool {
    matches!(
        op.method,
        HttpMethod::Get | HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete
    ) || op
        .summary
        .as_deref()
        .is_some_and(|s| s.chars().count() > MEANINGFUL_SUMMARY)
}
