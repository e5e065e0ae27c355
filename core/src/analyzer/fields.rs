//! # Resource Fields
//!
//! Attaches flattened component-schema fields to each extracted resource.

use heck::ToPascalCase;
use tracing::debug;

use crate::analyzer::schema_reducer::schema_to_fields;
use crate::models::{DetailLevel, Field, ResourceMap};
use crate::spec::models::OpenApiSpec;

const SCHEMA_SUFFIXES: [&str; 4] = ["Response", "Request", "Model", "DTO"];

/// Component schema names that may describe resource `name`, most specific first.
///
/// `order-items` yields `order-items`, `OrderItems`, `OrderItem`, then each of
/// those with a `Response`, `Request`, `Model` or `DTO` suffix.
pub fn candidate_schema_names(name: &str) -> Vec<String> {
    let pascal = name.to_pascal_case();
    let singular = singularize(&pascal);
    let bases = [name.to_string(), pascal, singular];

    let mut names: Vec<String> = Vec::new();
    let suffixed = SCHEMA_SUFFIXES
        .iter()
        .flat_map(|suffix| bases.iter().map(move |base| format!("{}{}", base, suffix)));
    for candidate in bases.iter().cloned().chain(suffixed) {
        if !candidate.is_empty() && !names.contains(&candidate) {
            names.push(candidate);
        }
    }
    names
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.to_string(),
        _ => word.to_string(),
    }
}

/// Appends the fields of `incoming` whose names are not already present.
pub fn merge_fields(existing: &mut Vec<Field>, incoming: Vec<Field>) {
    for field in incoming {
        if !existing.iter().any(|f| f.name == field.name) {
            existing.push(field);
        }
    }
}

/// Populates every resource's `fields` from matching component schemas.
pub fn attach_fields(resources: &mut ResourceMap, spec: &OpenApiSpec, level: DetailLevel) {
    for resource in resources.values_mut() {
        for schema_name in candidate_schema_names(&resource.name) {
            if let Some(schema) = spec.schema(&schema_name) {
                merge_fields(&mut resource.fields, schema_to_fields(schema, level));
            }
        }
        debug!(
            resource = %resource.name,
            fields = resource.fields.len(),
            "Attached schema fields"
        );
    }
}
