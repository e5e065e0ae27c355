#![deny(missing_docs)]

//! # Document Models
//!
//! Serde structures describing the subset of an OpenAPI 3.x document the
//! analyzer reads. Deserialization is lenient: unknown keys are ignored,
//! `x-` path extensions are skipped, and a handful of loosely-typed fields
//! (version numbers, `type` arrays, boolean `required`) are normalized while
//! reading.

use std::fmt;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::spec::refs::component_name;

/// HTTP verbs an OpenAPI path item may declare, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// Every method, in the order operations are visited.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Trace,
    ];

    /// Upper-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root of a parsed OpenAPI 3.x document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenApiSpec {
    /// Declared OpenAPI version (`3.0.3`, `3.1.0`, ...).
    #[serde(default)]
    pub openapi: String,
    /// Document metadata.
    #[serde(default)]
    pub info: Info,
    /// Server list.
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Path items keyed by path template, in document order.
    #[serde(default, deserialize_with = "de_paths")]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components.
    #[serde(default)]
    pub components: Components,
    /// Top-level tag declarations.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Source version when the document was upgraded from Swagger.
    #[serde(skip)]
    pub converted_from: Option<String>,
}

/// Metadata about the API (Info Object).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    /// API title.
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub title: Option<String>,
    /// API description.
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub description: Option<String>,
    /// Document version. YAML authors often write it as a bare number.
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub version: Option<String>,
}

/// Server Object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Server {
    /// Server URL.
    #[serde(default)]
    pub url: String,
    /// Server description.
    pub description: Option<String>,
}

/// Tag Object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tag {
    /// Tag name.
    #[serde(default)]
    pub name: String,
    /// Tag description.
    pub description: Option<String>,
}

/// Path Item Object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    /// Summary shared by every operation.
    pub summary: Option<String>,
    /// Description shared by every operation.
    pub description: Option<String>,
    /// GET operation.
    pub get: Option<Operation>,
    /// POST operation.
    pub post: Option<Operation>,
    /// PUT operation.
    pub put: Option<Operation>,
    /// DELETE operation.
    pub delete: Option<Operation>,
    /// PATCH operation.
    pub patch: Option<Operation>,
    /// HEAD operation.
    pub head: Option<Operation>,
    /// OPTIONS operation.
    pub options: Option<Operation>,
    /// TRACE operation.
    pub trace: Option<Operation>,
    /// Parameters shared by every operation on this path.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// Returns the operation declared for `method`, if any.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    /// Iterates over the declared operations in [`HttpMethod::ALL`] order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> + '_ {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }
}

/// Operation Object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Unique operation identifier.
    pub operation_id: Option<String>,
    /// Operation parameters (possibly `$ref`s).
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Request body.
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
}

/// Parameter Object (or a reference to one).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameter {
    /// Local reference to `#/components/parameters/...`.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// Parameter name.
    #[serde(default)]
    pub name: String,
    /// Location: `query`, `path`, `header` or `cookie`.
    #[serde(rename = "in", default)]
    pub location: String,
    /// Description.
    pub description: Option<String>,
    /// Whether the parameter is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Value schema.
    pub schema: Option<Schema>,
}

impl Parameter {
    /// True for `in: query` parameters.
    pub fn is_query(&self) -> bool {
        self.location == "query"
    }
}

/// Request Body Object (or a reference to one).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    /// Local reference to `#/components/requestBodies/...`.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Whether the body is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Media types, in document order.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Response Object (or a reference to one).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    /// Local reference to `#/components/responses/...`.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Media types, in document order.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media Type Object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<Schema>,
}

/// Components Object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Named schemas, in document order.
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
    /// Reusable parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
    /// Reusable responses.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    /// Reusable request bodies.
    #[serde(default)]
    pub request_bodies: IndexMap<String, RequestBody>,
    /// Security schemes, in document order.
    #[serde(default)]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// Security Scheme Object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    /// Scheme type: `http`, `apiKey`, `oauth2`, `openIdConnect`.
    #[serde(rename = "type", default)]
    pub scheme_type: String,
    /// Description.
    pub description: Option<String>,
    /// Header/query/cookie name for API keys.
    pub name: Option<String>,
    /// API key location.
    #[serde(rename = "in")]
    pub location: Option<String>,
    /// HTTP auth scheme (`basic`, `bearer`).
    pub scheme: Option<String>,
    /// Bearer token format hint.
    pub bearer_format: Option<String>,
    /// OpenID Connect discovery URL.
    pub open_id_connect_url: Option<String>,
}

/// Schema Object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schema {
    /// Local reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// Primary type. `["string", "null"]` collapses to `string`.
    #[serde(rename = "type", deserialize_with = "de_schema_type")]
    pub schema_type: Option<String>,
    /// Format hint.
    pub format: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Required property names. Draft-3 style booleans are ignored.
    #[serde(deserialize_with = "de_required")]
    pub required: Vec<String>,
    /// Enumerated values.
    #[serde(rename = "enum")]
    pub enum_values: Vec<Value>,
    /// Array item schema.
    pub items: Option<Box<Schema>>,
    /// Object properties, in document order.
    pub properties: IndexMap<String, Schema>,
    /// `allOf` composition.
    pub all_of: Vec<Schema>,
    /// `oneOf` composition.
    pub one_of: Vec<Schema>,
    /// `anyOf` composition.
    pub any_of: Vec<Schema>,
    /// Additional properties (bool or schema).
    pub additional_properties: Option<Value>,
    /// OpenAPI 3.0 nullability flag.
    pub nullable: bool,
    /// Deprecation flag.
    pub deprecated: bool,
    /// Read-only flag.
    pub read_only: bool,
    /// Write-only flag.
    pub write_only: bool,
    /// Example value.
    pub example: Option<Value>,
    /// Default value.
    pub default: Option<Value>,
    /// Regex constraint.
    pub pattern: Option<String>,
    /// Minimum string length.
    pub min_length: Option<u64>,
    /// Maximum string length.
    pub max_length: Option<u64>,
    /// Inclusive numeric minimum.
    pub minimum: Option<f64>,
    /// Inclusive numeric maximum.
    pub maximum: Option<f64>,
}

impl Schema {
    /// Checks the primary type.
    pub fn is_type(&self, name: &str) -> bool {
        self.schema_type.as_deref() == Some(name)
    }

    /// Objects are either declared `type: object` or carry properties without a type.
    pub fn is_object(&self) -> bool {
        match self.schema_type.as_deref() {
            Some(t) => t == "object",
            None => !self.properties.is_empty(),
        }
    }

    /// Whether `name` is listed in `required`.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// The referenced schema name, for `$ref` schemas.
    pub fn ref_name(&self) -> Option<&str> {
        self.ref_path
            .as_deref()
            .map(crate::spec::refs::extract_ref_name)
    }
}

impl OpenApiSpec {
    /// Looks up a component schema by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.components.schemas.get(name)
    }

    /// Follows a single `$ref` hop into `#/components/schemas`.
    /// Unresolvable references return the schema unchanged.
    pub fn resolve_schema<'a>(&'a self, schema: &'a Schema) -> &'a Schema {
        schema
            .ref_path
            .as_deref()
            .and_then(|r| component_name(r, "schemas"))
            .and_then(|name| self.schema(name))
            .unwrap_or(schema)
    }

    /// Resolves a parameter reference one level deep.
    /// Dangling references resolve to `None`.
    pub fn resolve_parameter<'a>(&'a self, param: &'a Parameter) -> Option<&'a Parameter> {
        match param.ref_path.as_deref() {
            None => Some(param),
            Some(r) => component_name(r, "parameters")
                .and_then(|name| self.components.parameters.get(name))
                .filter(|p| p.ref_path.is_none()),
        }
    }

    /// Resolves a request body reference one level deep.
    pub fn resolve_request_body<'a>(&'a self, body: &'a RequestBody) -> &'a RequestBody {
        body.ref_path
            .as_deref()
            .and_then(|r| component_name(r, "requestBodies"))
            .and_then(|name| self.components.request_bodies.get(name))
            .unwrap_or(body)
    }

    /// Resolves a response reference one level deep.
    pub fn resolve_response<'a>(&'a self, response: &'a Response) -> &'a Response {
        response
            .ref_path
            .as_deref()
            .and_then(|r| component_name(r, "responses"))
            .and_then(|name| self.components.responses.get(name))
            .unwrap_or(response)
    }

    /// Effective parameters for an operation.
    ///
    /// Path-level parameters come first; an operation parameter with the same
    /// `(name, in)` pair replaces its path-level counterpart in place.
    pub fn operation_parameters<'a>(
        &'a self,
        item: &'a PathItem,
        op: &'a Operation,
    ) -> Vec<&'a Parameter> {
        let mut merged: Vec<&Parameter> = item
            .parameters
            .iter()
            .filter_map(|p| self.resolve_parameter(p))
            .collect();

        for param in op.parameters.iter().filter_map(|p| self.resolve_parameter(p)) {
            match merged
                .iter()
                .position(|e| e.name == param.name && e.location == param.location)
            {
                Some(idx) => merged[idx] = param,
                None => merged.push(param),
            }
        }
        merged
    }

    /// First non-empty server URL.
    pub fn base_url(&self) -> Option<&str> {
        self.servers
            .iter()
            .map(|s| s.url.as_str())
            .find(|url| !url.is_empty())
    }

    /// Human label for the document flavour, e.g. `OpenAPI 3.0.3`.
    pub fn spec_type(&self) -> String {
        match &self.converted_from {
            Some(version) => format!("Swagger {} (converted)", version),
            None => format!("OpenAPI {}", self.openapi),
        }
    }
}

/// Deserializes the Paths Object, skipping `x-` extensions.
fn de_paths<'de, D>(deserializer: D) -> Result<IndexMap<String, PathItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<IndexMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut paths = IndexMap::with_capacity(raw.len());
    for (key, value) in raw {
        if key.starts_with("x-") {
            continue;
        }
        let item = if value.is_null() {
            PathItem::default()
        } else {
            PathItem::deserialize(value)
                .map_err(|e| D::Error::custom(format!("path '{}': {}", key, e)))?
        };
        paths.insert(key, item);
    }
    Ok(paths)
}

/// Accepts strings, numbers and booleans as text.
fn de_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// `type` may be a string or (OpenAPI 3.1) a list; lists yield the first non-`null` entry.
fn de_schema_type<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if s != "null" => Some(s),
                _ => None,
            })
            .next(),
        _ => None,
    })
}

/// `required` is a list of names on schemas; anything else is ignored.
fn de_required<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec_from(value: Value) -> OpenApiSpec {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_schema_type_variants() {
        let s: Schema = serde_json::from_value(json!({"type": ["null", "integer"]})).unwrap();
        assert_eq!(s.schema_type.as_deref(), Some("integer"));

        let s: Schema = serde_json::from_value(json!({"type": ["null"]})).unwrap();
        assert_eq!(s.schema_type, None);

        let s: Schema = serde_json::from_value(json!({"type": "string"})).unwrap();
        assert!(s.is_type("string"));
    }

    #[test]
    fn test_boolean_required_is_ignored() {
        let s: Schema = serde_json::from_value(json!({
            "type": "object",
            "required": true,
            "properties": {"id": {"type": "string"}}
        }))
        .unwrap();
        assert!(s.required.is_empty());
        assert!(!s.is_required("id"));
    }

    #[test]
    fn test_typeless_schema_with_properties_is_object() {
        let s: Schema =
            serde_json::from_value(json!({"properties": {"id": {"type": "string"}}})).unwrap();
        assert!(s.is_object());
        assert!(!Schema::default().is_object());
    }

    #[test]
    fn test_paths_skip_extensions_and_keep_order() {
        let spec = spec_from(json!({
            "openapi": "3.0.0",
            "paths": {
                "/b": {"get": {}},
                "x-internal": {"anything": true},
                "/a": {"post": {}},
                "/c": null
            }
        }));
        let keys: Vec<&str> = spec.paths.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/b", "/a", "/c"]);
    }

    #[test]
    fn test_numeric_info_version() {
        let spec = spec_from(json!({"info": {"title": "T", "version": 2}}));
        assert_eq!(spec.info.version.as_deref(), Some("2"));
    }

    #[test]
    fn test_operations_order() {
        let item: PathItem = serde_json::from_value(json!({
            "trace": {}, "delete": {}, "get": {}, "post": {}
        }))
        .unwrap();
        let methods: Vec<HttpMethod> = item.operations().map(|(m, _)| m).collect();
        assert_eq!(
            methods,
            vec![
                HttpMethod::Get,
                HttpMethod::Post,
                HttpMethod::Delete,
                HttpMethod::Trace
            ]
        );
    }

    #[test]
    fn test_operation_parameters_merge_and_resolve() {
        let spec = spec_from(json!({
            "openapi": "3.0.0",
            "paths": {
                "/users/{id}": {
                    "parameters": [
                        {"name": "id", "in": "path", "required": true, "description": "path level"},
                        {"$ref": "#/components/parameters/Trace"}
                    ],
                    "get": {
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "description": "op level"},
                            {"$ref": "#/components/parameters/Limit"},
                            {"$ref": "#/components/parameters/Missing"}
                        ]
                    }
                }
            },
            "components": {
                "parameters": {
                    "Limit": {"name": "limit", "in": "query"},
                    "Trace": {"name": "X-Trace", "in": "header"}
                }
            }
        }));
        let item = &spec.paths["/users/{id}"];
        let op = item.get.as_ref().unwrap();
        let params = spec.operation_parameters(item, op);
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "X-Trace", "limit"]);
        assert_eq!(params[0].description.as_deref(), Some("op level"));
        assert!(params[2].is_query());
    }

    #[test]
    fn test_resolve_schema_single_hop() {
        let spec = spec_from(json!({
            "components": {"schemas": {"User": {"type": "object"}}}
        }));
        let reference: Schema =
            serde_json::from_value(json!({"$ref": "#/components/schemas/User"})).unwrap();
        assert!(spec.resolve_schema(&reference).is_type("object"));
        assert_eq!(reference.ref_name(), Some("User"));

        let dangling: Schema =
            serde_json::from_value(json!({"$ref": "#/components/schemas/Nope"})).unwrap();
        assert_eq!(spec.resolve_schema(&dangling), &dangling);
    }

    #[test]
    fn test_spec_type_label() {
        let mut spec = spec_from(json!({"openapi": "3.1.0"}));
        assert_eq!(spec.spec_type(), "OpenAPI 3.1.0");
        spec.converted_from = Some("2.0".into());
        assert_eq!(spec.spec_type(), "Swagger 2.0 (converted)");
    }
}
