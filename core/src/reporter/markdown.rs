//! Markdown rendering.

use crate::analyzer::relationship::sorted_relationships;
use crate::models::{capitalize, ApiAnalysis, Field, Operation, Pattern, Resource, Strength};
use crate::reporter::{escape_cell, sorted_operations, truncate};

const SUMMARY_WIDTH: usize = 80;
const CELL_WIDTH: usize = 50;

/// Renders the full Markdown document.
pub fn render_markdown(analysis: &ApiAnalysis) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", analysis.title));
    if let Some(description) = &analysis.description {
        out.push_str(&format!("{}\n\n", description));
    }

    out.push_str("## Overview\n\n");
    out.push_str(&format!("- **API Version**: {}\n", analysis.version));
    out.push_str(&format!("- **Specification Type**: {}\n", analysis.spec_type));
    if let Some(base_url) = &analysis.base_url {
        out.push_str(&format!("- **Base URL**: {}\n", base_url));
    }
    out.push_str(&format!(
        "- **Generated**: {}\n\n",
        analysis.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let stats = &analysis.summary;
    out.push_str("## API Statistics\n\n");
    out.push_str(&format!("- **Total Resources**: {}\n", stats.total_resources));
    out.push_str(&format!("- **Total Operations**: {}\n", stats.total_operations));
    out.push_str(&format!("- **Total Endpoints**: {}\n", stats.total_endpoints));
    out.push_str(&format!("- **Resource Coverage**: {}%\n\n", stats.resource_coverage));

    let mut resources: Vec<&Resource> = analysis.resources.iter().collect();
    resources.sort_by(|a, b| a.name.cmp(&b.name));

    out.push_str("## Resources\n\n");
    out.push_str("This section groups API endpoints by business resources.\n\n");
    for resource in &resources {
        write_resource(&mut out, resource);
    }

    if resources.iter().any(|r| !r.relationships.is_empty()) {
        out.push_str("## Resource Relationships\n\n");
        out.push_str("### Relationship Diagram\n\n");
        out.push_str("```mermaid\n");
        out.push_str(&mermaid_diagram(&resources));
        out.push_str("```\n\n");
        out.push_str("### Relationship Details\n\n");
        write_relationship_details(&mut out, &resources);
    }

    if !analysis.patterns.is_empty() {
        out.push_str("## Detected Patterns\n\n");
        for pattern in &analysis.patterns {
            write_pattern(&mut out, pattern);
        }
    }

    out
}

fn write_resource(out: &mut String, resource: &Resource) {
    out.push_str(&format!("### {}\n\n", capitalize(&resource.name)));
    if !resource.description.is_empty() {
        out.push_str(&format!("{}\n\n", resource.description));
    }
    if let Some(category) = resource.category {
        out.push_str(&format!("**Category**: {}  \n", category));
    }
    if resource.is_collection {
        out.push_str("**Type**: Collection Resource  \n");
    }
    out.push_str(&format!("**Operations**: {}\n\n", resource.operations.len()));

    let operations = sorted_operations(&resource.operations);
    if !operations.is_empty() {
        out.push_str("| Method | Path | Summary |\n");
        out.push_str("|--------|------|---------|\n");
        for op in &operations {
            let summary = op.summary.as_deref().or(op.description.as_deref()).unwrap_or_default();
            out.push_str(&format!(
                "| {} | `{}` | {} |\n",
                op.method,
                op.path,
                escape_cell(&truncate(summary, SUMMARY_WIDTH))
            ));
        }
        out.push('\n');
    }

    if !resource.fields.is_empty() {
        write_fields(out, &resource.fields);
    }

    for op in &operations {
        write_operation_details(out, op);
    }
}

fn write_fields(out: &mut String, fields: &[Field]) {
    out.push_str("**Fields**:\n\n");
    out.push_str("| Name | Type | Required | Description |\n");
    out.push_str("|------|------|----------|-------------|\n");
    for field in fields {
        let mut type_label = field.field_type.label();
        if field.deprecated {
            type_label.push_str(" (deprecated)");
        }
        out.push_str(&format!(
            "| `{}` | {} | {} | {} |\n",
            field.name,
            escape_cell(&type_label),
            yes_no(field.required),
            escape_cell(&truncate(field.description.as_deref().unwrap_or_default(), CELL_WIDTH))
        ));
    }
    out.push('\n');
}

fn write_operation_details(out: &mut String, op: &Operation) {
    if op.description.is_none() && op.parameters.is_empty() && op.responses.is_empty() {
        return;
    }

    out.push_str(&format!("#### {} {}\n\n", op.method, op.path));
    if let Some(description) = &op.description {
        out.push_str(&format!("{}\n\n", description));
    }
    if !op.tags.is_empty() {
        out.push_str(&format!("**Tags**: {}\n\n", op.tags.join(", ")));
    }
    if op.deprecated {
        out.push_str("**Deprecated**\n\n");
    }

    if !op.parameters.is_empty() {
        out.push_str("**Parameters**:\n\n");
        out.push_str("| Name | In | Type | Required | Description |\n");
        out.push_str("|------|----|------|----------|-------------|\n");
        for param in &op.parameters {
            let type_label = param
                .field_type
                .as_ref()
                .map_or_else(|| "-".to_string(), |t| t.label());
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                param.name,
                param.location,
                escape_cell(&type_label),
                yes_no(param.required),
                escape_cell(&truncate(param.description.as_deref().unwrap_or_default(), CELL_WIDTH))
            ));
        }
        out.push('\n');
    }

    if let Some(body) = &op.request_body {
        out.push_str("**Request Body**:\n\n");
        if let Some(description) = &body.description {
            out.push_str(&format!("{}\n\n", description));
        }
        if !body.content_types.is_empty() {
            out.push_str(&format!("- **Content Type**: {}\n", body.content_types.join(", ")));
        }
        if let Some(schema) = &body.schema {
            out.push_str(&format!("- **Schema**: {}\n", schema.label()));
        }
        if body.required {
            out.push_str("- **Required**: Yes\n");
        }
        out.push('\n');
    }

    if !op.responses.is_empty() {
        out.push_str("**Responses**:\n\n");
        out.push_str("| Status | Description | Content Type |\n");
        out.push_str("|--------|-------------|--------------|\n");
        for response in &op.responses {
            let content_type = if response.content_types.is_empty() {
                "-".to_string()
            } else {
                response.content_types.join(", ")
            };
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                response.status_code,
                escape_cell(&truncate(response.description.as_deref().unwrap_or_default(), CELL_WIDTH)),
                content_type
            ));
        }
        out.push('\n');
    }

    out.push_str("---\n\n");
}

/// Mermaid node ids only allow a restricted character set.
fn node_id(name: &str) -> String {
    let id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if id.is_empty() {
        "_".to_string()
    } else {
        id
    }
}

/// `graph TD` diagram. Strong edges are solid, the rest dotted.
pub fn mermaid_diagram(resources: &[&Resource]) -> String {
    let mut out = String::from("graph TD\n");
    for resource in resources {
        out.push_str(&format!("    {}[\"{}\"]\n", node_id(&resource.name), resource.name));
    }
    for resource in resources {
        for rel in sorted_relationships(resource) {
            let arrow = match rel.strength {
                Strength::Strong => "-->",
                Strength::Medium | Strength::Weak => "-.->",
            };
            out.push_str(&format!(
                "    {} {}|{}| {}\n",
                node_id(&resource.name),
                arrow,
                rel.kind,
                node_id(&rel.resource)
            ));
        }
    }
    out
}

fn write_relationship_details(out: &mut String, resources: &[&Resource]) {
    for resource in resources.iter().filter(|r| !r.relationships.is_empty()) {
        out.push_str(&format!("#### {} Relationships\n\n", capitalize(&resource.name)));
        for rel in sorted_relationships(resource) {
            out.push_str(&format!(
                "- **{}** {} ({} strength",
                rel.kind, rel.resource, rel.strength
            ));
            if !rel.via.is_empty() {
                out.push_str(&format!(" via `{}`", rel.via));
            }
            out.push_str(")\n");
            if !rel.description.is_empty() {
                out.push_str(&format!("  - {}\n", rel.description));
            }
        }
        out.push('\n');
    }
}

fn write_pattern(out: &mut String, pattern: &Pattern) {
    out.push_str(&format!("### {}\n\n", pattern.kind.title()));
    out.push_str(&format!("**Confidence**: {}  \n", pattern.confidence));
    out.push_str(&format!("**Impact**: {}\n\n", pattern.impact));
    out.push_str(&format!("{}\n\n", pattern.description));
    if !pattern.examples.is_empty() {
        out.push_str("**Examples**:\n");
        for example in &pattern.examples {
            out.push_str(&format!("- `{}`\n", example));
        }
        out.push('\n');
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
