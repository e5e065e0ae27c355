//! # Schema Reduction
//!
//! Trims component schemas down to the properties a reader needs, then
//! flattens them into [`Field`] lists. Reduction never mutates the caller's
//! schema; a reduced copy is returned.

use serde_json::Value;

use crate::models::{DetailLevel, Field, FieldType};
use crate::spec::models::Schema;
use crate::spec::refs::extract_ref_name;

const ESSENTIAL_NAMES: [&str; 7] = ["name", "title", "label", "email", "type", "status", "state"];
const ESSENTIAL_SUFFIXES: [&str; 2] = ["_name", "_type"];

const TIMESTAMP_FORMATS: [&str; 2] = ["date", "date-time"];
const TIMESTAMP_SUFFIXES: [&str; 4] = ["_at", "_on", "_date", "_time"];
const TIMESTAMP_WORDS: [&str; 5] = ["created", "updated", "modified", "deleted", "timestamp"];

const METADATA_NAMES: [&str; 6] = ["metadata", "meta", "links", "embedded", "_links", "_embedded"];
const VERSIONING_NAMES: [&str; 4] = ["version", "revision", "etag", "__v"];

/// Returns a copy of `schema` with properties filtered for `level`.
///
/// Required properties always survive. Filtering recurses into surviving
/// object properties but not into array items.
pub fn reduce_schema(schema: &Schema, level: DetailLevel) -> Schema {
    let mut reduced = schema.clone();
    if level != DetailLevel::Full {
        reduce_properties(&mut reduced, level);
    }
    reduced
}

/// Reduces `schema` for `level` and flattens it into dotted-path fields.
pub fn schema_to_fields(schema: &Schema, level: DetailLevel) -> Vec<Field> {
    let reduced = reduce_schema(schema, level);
    let mut fields = Vec::new();
    extract_fields(&reduced, "", &mut fields);
    fields
}

fn reduce_properties(schema: &mut Schema, level: DetailLevel) {
    let required = std::mem::take(&mut schema.required);
    let properties = std::mem::take(&mut schema.properties);

    schema.properties = properties
        .into_iter()
        .filter(|(name, prop)| keep_property(name, prop, required.contains(name), level))
        .map(|(name, mut prop)| {
            if prop.is_object() {
                reduce_properties(&mut prop, level);
            }
            (name, prop)
        })
        .collect();
    schema.required = required;
}

fn keep_property(name: &str, schema: &Schema, required: bool, level: DetailLevel) -> bool {
    if required {
        return true;
    }
    match level {
        DetailLevel::Essential => is_essential_field(name, schema),
        DetailLevel::Standard => !is_technical_field(name, schema),
        DetailLevel::Full => true,
    }
}

/// Identifiers, names, contact and classification fields, plus objects that
/// contain any of them (or any required child).
pub fn is_essential_field(name: &str, schema: &Schema) -> bool {
    let lower = name.to_lowercase();

    if !lower.starts_with("internal") && (lower.contains("id") || lower.contains("uuid")) {
        return true;
    }
    if ESSENTIAL_NAMES.contains(&lower.as_str()) || schema.format.as_deref() == Some("email") {
        return true;
    }
    if ESSENTIAL_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return true;
    }

    schema.is_object()
        && schema
            .properties
            .iter()
            .any(|(child, prop)| schema.is_required(child) || is_essential_field(child, prop))
}

/// Timestamps, underscore-prefixed internals, hypermedia/metadata and
/// concurrency-control fields.
pub fn is_technical_field(name: &str, schema: &Schema) -> bool {
    let lower = name.to_lowercase();

    is_timestamp_field(name, schema)
        || name.starts_with('_')
        || METADATA_NAMES.contains(&lower.as_str())
        || VERSIONING_NAMES.contains(&lower.as_str())
}

/// `date`/`date-time` formats and the usual timestamp naming conventions.
pub fn is_timestamp_field(name: &str, schema: &Schema) -> bool {
    if schema
        .format
        .as_deref()
        .is_some_and(|f| TIMESTAMP_FORMATS.contains(&f))
    {
        return true;
    }
    let lower = name.to_lowercase();
    TIMESTAMP_SUFFIXES.iter().any(|s| lower.ends_with(s))
        || TIMESTAMP_WORDS.iter().any(|w| lower.contains(w))
}

fn extract_fields(schema: &Schema, prefix: &str, fields: &mut Vec<Field>) {
    if !schema.is_object() {
        return;
    }
    for (name, prop) in &schema.properties {
        let field_name = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };

        fields.push(Field {
            name: field_name.clone(),
            field_type: build_field_type(prop),
            description: prop.description.clone(),
            required: schema.is_required(name),
            example: prop.example.as_ref().map(example_text),
            deprecated: prop.deprecated,
        });

        if prop.is_object() {
            extract_fields(prop, &field_name, fields);
        }
    }
}

/// Type summary of a schema.
///
/// `$ref` schemas are named after the referenced schema; untyped schemas
/// default to `object`. Only string enum members are kept.
pub fn build_field_type(schema: &Schema) -> FieldType {
    let mut field_type = FieldType {
        type_name: schema.schema_type.clone().unwrap_or_default(),
        format: schema.format.clone(),
        pattern: schema.pattern.clone(),
        min_length: schema.min_length,
        max_length: schema.max_length,
        minimum: schema.minimum,
        maximum: schema.maximum,
        ..FieldType::default()
    };

    if schema.is_type("array") {
        field_type.items = schema
            .items
            .as_deref()
            .map(|items| Box::new(build_field_type(items)));
    }

    field_type.enum_values = schema
        .enum_values
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    if let Some(reference) = &schema.ref_path {
        field_type.type_name = extract_ref_name(reference).to_string();
        field_type.reference = Some(reference.clone());
    }

    if field_type.type_name.is_empty() {
        field_type.type_name = "object".into();
    }
    field_type
}

fn example_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
