#![deny(missing_docs)]

//! # Document Loader
//!
//! Reads JSON or YAML text into an [`OpenApiSpec`], detecting the declared
//! version and upgrading Swagger 2.0 documents on the way.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::spec::convert::convert_swagger2;
use crate::spec::models::OpenApiSpec;

/// Version marker found at the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
enum VersionMarker {
    Swagger(String),
    OpenApi(String),
}

/// Parses an OpenAPI 3.x or Swagger 2.0 document from JSON or YAML text.
///
/// # Errors
///
/// * [`AppError::Parse`] when the text is neither JSON nor YAML, or does not fit the model.
/// * [`AppError::InvalidSpec`] when the document is empty, lacks a version marker or `info`.
/// * [`AppError::UnsupportedVersion`] for Swagger other than 2.0 and OpenAPI other than 3.x.
pub fn parse_spec(content: &str) -> AppResult<OpenApiSpec> {
    let mut document = parse_document(content)?;

    let marker = detect_version(&document)?;
    let converted_from = match marker {
        VersionMarker::Swagger(version) if version == "2.0" => Some(version),
        VersionMarker::Swagger(version) => {
            return Err(AppError::UnsupportedVersion(format!("Swagger {}", version)))
        }
        VersionMarker::OpenApi(version) if version.starts_with("3.") => {
            if let Some(root) = document.as_object_mut() {
                root.insert("openapi".into(), Value::String(version));
            }
            None
        }
        VersionMarker::OpenApi(version) => {
            return Err(AppError::UnsupportedVersion(format!("OpenAPI {}", version)))
        }
    };

    if !document.get("info").is_some_and(Value::is_object) {
        return Err(AppError::InvalidSpec(
            "document missing required 'info' object".into(),
        ));
    }

    if let Some(version) = &converted_from {
        info!(from = %version, "Converting Swagger document to OpenAPI 3.0");
        document = convert_swagger2(document)?;
    }
    normalize_boolean_schemas(&mut document);

    let mut spec: OpenApiSpec = serde_json::from_value(document)
        .map_err(|e| AppError::Parse(format!("Failed to read OpenAPI document: {}", e)))?;
    spec.converted_from = converted_from;

    debug!(
        openapi = %spec.openapi,
        paths = spec.paths.len(),
        schemas = spec.components.schemas.len(),
        "Parsed API document"
    );
    Ok(spec)
}

/// Reads and parses a document from disk.
pub fn load_spec_file(path: impl AsRef<Path>) -> AppResult<OpenApiSpec> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading API document");
    let content = fs::read_to_string(path)?;
    parse_spec(&content)
}

/// JSON first when the text looks like an object, YAML otherwise.
fn parse_document(content: &str) -> AppResult<Value> {
    let trimmed = content.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidSpec("document is empty".into()));
    }

    let document: Value = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed)
            .or_else(|_| serde_yaml::from_str(trimmed))
            .map_err(|e| AppError::Parse(format!("Failed to parse document: {}", e)))?
    } else {
        serde_yaml::from_str(trimmed)
            .map_err(|e| AppError::Parse(format!("Failed to parse document: {}", e)))?
    };

    match document {
        Value::Object(_) => Ok(document),
        Value::Null => Err(AppError::InvalidSpec("document is empty".into())),
        _ => Err(AppError::InvalidSpec(
            "document root must be a mapping".into(),
        )),
    }
}

fn detect_version(document: &Value) -> AppResult<VersionMarker> {
    if let Some(version) = document.get("swagger") {
        return Ok(VersionMarker::Swagger(version_text(version)));
    }
    if let Some(version) = document.get("openapi") {
        return Ok(VersionMarker::OpenApi(version_text(version)));
    }
    Err(AppError::InvalidSpec(
        "missing version field (openapi or swagger)".into(),
    ))
}

/// YAML turns `swagger: 2.0` into a float, so numbers are accepted as text.
fn version_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Rewrites OpenAPI 3.1 boolean schemas (`true` / `false`) into empty object
/// schemas and collapses tuple-style `items` lists to their first entry.
pub(crate) fn normalize_boolean_schemas(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                match key.as_str() {
                    "schema" => normalize_schema_node(child),
                    "schemas" => {
                        if let Value::Object(schemas) = child {
                            schemas.values_mut().for_each(normalize_schema_node);
                        }
                    }
                    _ => normalize_boolean_schemas(child),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_boolean_schemas),
        _ => {}
    }
}

fn normalize_schema_node(node: &mut Value) {
    if node.is_boolean() {
        *node = Value::Object(Map::new());
        return;
    }
    let Value::Object(map) = node else {
        return;
    };

    if let Some(Value::Object(props)) = map.get_mut("properties") {
        props.values_mut().for_each(normalize_schema_node);
    }
    if let Some(items) = map.get_mut("items") {
        if let Value::Array(list) = items {
            let first = list.first().cloned().unwrap_or_else(|| Value::Object(Map::new()));
            *items = first;
        }
        normalize_schema_node(items);
    }
    for key in ["allOf", "oneOf", "anyOf"] {
        if let Some(Value::Array(list)) = map.get_mut(key) {
            list.iter_mut().for_each(normalize_schema_node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"
openapi: 3.0.3
info:
  title: Minimal
  version: "2.1"
paths:
  /users:
    get:
      responses:
        "200":
          description: ok
"#;

    #[test]
    fn test_parse_yaml() {
        let spec = parse_spec(MINIMAL).unwrap();
        assert_eq!(spec.openapi, "3.0.3");
        assert_eq!(spec.info.title.as_deref(), Some("Minimal"));
        assert!(spec.paths.contains_key("/users"));
        assert!(spec.converted_from.is_none());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"openapi": "3.1.0", "info": {"title": "J", "version": "1"}, "paths": {}}"#;
        let spec = parse_spec(json).unwrap();
        assert_eq!(spec.spec_type(), "OpenAPI 3.1.0");
    }

    #[test]
    fn test_numeric_openapi_version() {
        let spec = parse_spec("openapi: 3.0\ninfo:\n  title: T\n  version: 1\n").unwrap();
        assert_eq!(spec.openapi, "3.0");
    }

    #[test]
    fn test_swagger_converted() {
        let doc = "swagger: '2.0'\ninfo:\n  title: Old\n  version: '1'\nhost: api.example.com\npaths: {}\n";
        let spec = parse_spec(doc).unwrap();
        assert_eq!(spec.converted_from.as_deref(), Some("2.0"));
        assert_eq!(spec.openapi, "3.0.3");
        assert_eq!(spec.base_url(), Some("https://api.example.com"));
        assert_eq!(spec.spec_type(), "Swagger 2.0 (converted)");
    }

    #[test]
    fn test_unsupported_versions() {
        let err = parse_spec("swagger: '1.2'\ninfo: {title: a, version: b}\n").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedVersion(ref v) if v == "Swagger 1.2"));

        let err = parse_spec("openapi: 2.5.0\ninfo: {title: a, version: b}\n").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_missing_version() {
        let err = parse_spec("info:\n  title: a\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid Spec: missing version field (openapi or swagger)"
        );
    }

    #[test]
    fn test_missing_info() {
        let err = parse_spec("openapi: 3.0.0\npaths: {}\n").unwrap_err();
        assert!(matches!(err, AppError::InvalidSpec(_)));
    }

    #[test]
    fn test_empty_and_scalar_documents() {
        assert!(matches!(parse_spec("   \n"), Err(AppError::InvalidSpec(_))));
        assert!(matches!(parse_spec("~"), Err(AppError::InvalidSpec(_))));
        assert!(matches!(parse_spec("- a\n- b\n"), Err(AppError::InvalidSpec(_))));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = parse_spec("openapi: [unclosed").unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_boolean_schemas_normalized() {
        let doc = r#"{
            "openapi": "3.1.0",
            "info": {"title": "B", "version": "1"},
            "components": {"schemas": {
                "Anything": true,
                "Box": {"type": "object", "properties": {"payload": true}, "required": ["payload"]}
            }}
        }"#;
        let spec = parse_spec(doc).unwrap();
        assert_eq!(spec.components.schemas.len(), 2);
        assert!(spec.components.schemas["Box"].properties["payload"]
            .schema_type
            .is_none());
    }

    #[test]
    fn test_load_spec_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("openapi.yaml");
        fs::File::create(&path)
            .unwrap()
            .write_all(MINIMAL.as_bytes())
            .unwrap();
        let spec = load_spec_file(&path).unwrap();
        assert_eq!(spec.paths.len(), 1);

        let err = load_spec_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
