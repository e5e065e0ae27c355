//! # Resource Extraction
//!
//! Groups the operations of an OpenAPI document into resources inferred from
//! path structure. A literal segment is treated as a resource when some path
//! addresses an instance below it (`/users/{id}`); literals that never have a
//! variable after them are actions (`/auth/login`, `/tasks/{id}/archive`) and
//! their operations are attributed to the nearest resource.

use std::collections::HashMap;

use tracing::debug;

use crate::analyzer::path::{is_resource_segment, tokenize, PathToken};
use crate::analyzer::schema_reducer::build_field_type;
use crate::models::{
    FieldType, HttpMethod, Operation, OperationParameter, RequestBodyInfo, Resource, ResourceCategory,
    ResourceMap, ResponseInfo,
};
use crate::spec::models::{MediaType, OpenApiSpec, Operation as SpecOperation, PathItem};

/// Aggregate over every path a segment name appears in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPattern {
    /// Some path places a variable after this segment.
    pub has_variables: bool,
    /// Paths containing the segment, in document order.
    pub paths: Vec<String>,
}

/// Extracts resources and their operations from a document.
///
/// TRACE operations are not attributed.
pub fn extract_resources(spec: &OpenApiSpec) -> ResourceMap {
    let patterns = analyze_path_patterns(spec.paths.keys().map(String::as_str));
    let mut resources = ResourceMap::new();

    for (path, item) in &spec.paths {
        for name in resources_for_path(path, &patterns) {
            let resource = resources
                .entry(name.clone())
                .or_insert_with(|| Resource::new(name));
            resource.operations.extend(
                item.operations()
                    .filter(|(method, _)| *method != HttpMethod::Trace)
                    .map(|(method, op)| build_operation(spec, path, item, method, op)),
            );
        }
    }

    for resource in resources.values_mut() {
        classify(resource);
    }

    debug!(
        paths = spec.paths.len(),
        resources = resources.len(),
        "Extracted resources"
    );
    resources
}

/// Builds the per-segment [`PathPattern`] table.
pub fn analyze_path_patterns<'a, I>(paths: I) -> HashMap<String, PathPattern>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut patterns: HashMap<String, PathPattern> = HashMap::new();

    for path in paths {
        let tokens = tokenize(path);
        for (idx, token) in tokens.iter().enumerate() {
            let Some(segment) = token.as_literal().filter(|s| is_resource_segment(s)) else {
                continue;
            };
            let entry = patterns.entry(segment.to_string()).or_default();
            if !entry.paths.iter().any(|p| p == path) {
                entry.paths.push(path.to_string());
            }
            if tokens[idx + 1..].iter().any(PathToken::is_variable) {
                entry.has_variables = true;
            }
        }
    }
    patterns
}

/// Decides which resources a path's operations belong to.
pub fn resources_for_path(path: &str, patterns: &HashMap<String, PathPattern>) -> Vec<String> {
    let tokens = tokenize(path);
    let positions: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.as_literal().is_some_and(is_resource_segment))
        .map(|(idx, _)| idx)
        .collect();

    let mut names: Vec<String> = Vec::with_capacity(positions.len());
    for &idx in &positions {
        if let Some(name) = tokens[idx].as_literal() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }

    if names.len() <= 1 {
        return names;
    }

    let nested = positions
        .windows(2)
        .any(|pair| tokens[pair[0] + 1..pair[1]].iter().any(PathToken::is_variable));

    if nested {
        let last = names.len() - 1;
        if is_action(&names[last], patterns) {
            names.truncate(last);
        }
        return names;
    }

    vec![select_primary_resource(&names, patterns)]
}

/// Picks one resource for a path whose segments are adjacent.
///
/// A trailing action belongs to its predecessor; otherwise the rightmost
/// segment with variables wins, falling back to the rightmost segment.
fn select_primary_resource(names: &[String], patterns: &HashMap<String, PathPattern>) -> String {
    let last = names.len() - 1;
    if last > 0 && is_action(&names[last], patterns) {
        return names[last - 1].clone();
    }
    names
        .iter()
        .rev()
        .find(|n| patterns.get(n.as_str()).is_some_and(|p| p.has_variables))
        .unwrap_or(&names[last])
        .clone()
}

fn is_action(name: &str, patterns: &HashMap<String, PathPattern>) -> bool {
    patterns.get(name).is_some_and(|p| !p.has_variables)
}

/// Fills `category` and `is_collection` from the attributed paths.
fn classify(resource: &mut Resource) {
    let token_lists: Vec<Vec<PathToken>> = resource
        .operations
        .iter()
        .map(|op| tokenize(&op.path))
        .collect();

    resource.is_collection = token_lists
        .iter()
        .any(|tokens| tokens.last().and_then(PathToken::as_literal) == Some(resource.name.as_str()));

    let admin = token_lists.iter().any(|tokens| {
        tokens
            .iter()
            .filter_map(PathToken::as_literal)
            .any(|s| s.eq_ignore_ascii_case("admin"))
    });
    let parameterized = token_lists.iter().any(|tokens| {
        tokens
            .iter()
            .position(|t| t.as_literal() == Some(resource.name.as_str()))
            .is_some_and(|idx| tokens[idx + 1..].iter().any(PathToken::is_variable))
    });

    resource.category = Some(if admin {
        ResourceCategory::Admin
    } else if !parameterized {
        ResourceCategory::Utility
    } else {
        ResourceCategory::Core
    });
}

/// Creates the analysis view of one operation.
fn build_operation(
    spec: &OpenApiSpec,
    path: &str,
    item: &PathItem,
    method: HttpMethod,
    op: &SpecOperation,
) -> Operation {
    let mut operation = Operation::new(method, path);
    operation.summary = op.summary.clone().or_else(|| item.summary.clone());
    operation.description = op.description.clone().or_else(|| item.description.clone());
    operation.operation_id = op.operation_id.clone();
    operation.tags = op.tags.clone();
    operation.deprecated = op.deprecated;

    operation.parameters = spec
        .operation_parameters(item, op)
        .into_iter()
        .map(|p| OperationParameter {
            name: p.name.clone(),
            location: p.location.clone(),
            description: p.description.clone(),
            required: p.required,
            field_type: p.schema.as_ref().map(build_field_type),
        })
        .collect();

    operation.request_body = op.request_body.as_ref().map(|body| {
        let body = spec.resolve_request_body(body);
        RequestBodyInfo {
            description: body.description.clone(),
            required: body.required,
            content_types: body.content.keys().cloned().collect(),
            schema: first_schema(body.content.values()),
        }
    });

    operation.responses = op
        .responses
        .iter()
        .map(|(status, response)| {
            let response = spec.resolve_response(response);
            ResponseInfo {
                status_code: status.clone(),
                description: response.description.clone(),
                content_types: response.content.keys().cloned().collect(),
                schema: first_schema(response.content.values()),
            }
        })
        .collect();

    operation
}

fn first_schema<'a, I>(media: I) -> Option<FieldType>
where
    I: IntoIterator<Item = &'a MediaType>,
{
    media
        .into_iter()
        .find_map(|m| m.schema.as_ref())
        .map(build_field_type)
}
