#![deny(missing_docs)]

//! # Swagger 2.0 Conversion
//!
//! Upgrades a Swagger 2.0 document (as a raw JSON value) into the OpenAPI 3.0
//! shape understood by [`crate::spec::models`]. The rewrite is structural only:
//! it moves fields to their 3.0 homes and rewrites local `$ref`s, it does not
//! validate.

use serde_json::{json, Map, Value};

use crate::error::{AppError, AppResult};

/// Version written into converted documents.
pub const CONVERTED_OPENAPI_VERSION: &str = "3.0.3";

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const DEFAULT_HOST: &str = "localhost";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

const REF_PREFIXES: [(&str, &str); 4] = [
    ("#/definitions/", "#/components/schemas/"),
    ("#/parameters/", "#/components/parameters/"),
    ("#/responses/", "#/components/responses/"),
    ("#/securityDefinitions/", "#/components/securitySchemes/"),
];

/// Parameter keys that move under `schema` in OpenAPI 3.
const SCHEMA_KEYS: [&str; 16] = [
    "type",
    "format",
    "items",
    "enum",
    "default",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
    "multipleOf",
];

const HTTP_METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

struct ConversionContext<'a> {
    consumes: Vec<String>,
    produces: Vec<String>,
    parameters: &'a Map<String, Value>,
}

impl ConversionContext<'_> {
    /// Body and form parameters cannot live in `components.parameters`,
    /// so references to them are inlined at the use site.
    fn inline_parameter(&self, param: Value) -> Value {
        let target = param
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix("#/parameters/"))
            .and_then(|name| self.parameters.get(name));

        match target {
            Some(global) if is_body_or_form(global) => global.clone(),
            _ => param,
        }
    }
}

/// Converts a Swagger 2.0 document into an OpenAPI 3.0 document.
///
/// # Arguments
///
/// * `document` - The parsed Swagger document (must be a JSON object).
pub fn convert_swagger2(document: Value) -> AppResult<Value> {
    let Value::Object(mut swagger) = document else {
        return Err(AppError::InvalidSpec(
            "Swagger document root must be an object".into(),
        ));
    };

    let global_parameters = swagger
        .get("parameters")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let ctx = ConversionContext {
        consumes: media_types(swagger.get("consumes")).unwrap_or_else(default_media_types),
        produces: media_types(swagger.get("produces")).unwrap_or_else(default_media_types),
        parameters: &global_parameters,
    };

    let mut out = Map::new();
    out.insert(
        "openapi".into(),
        Value::String(CONVERTED_OPENAPI_VERSION.into()),
    );
    for key in ["info", "tags", "security", "externalDocs"] {
        if let Some(value) = swagger.remove(key) {
            out.insert(key.into(), value);
        }
    }

    let servers = convert_servers(&swagger);
    if !servers.is_empty() {
        out.insert("servers".into(), Value::Array(servers));
    }

    let paths = match swagger.remove("paths") {
        Some(Value::Object(paths)) => convert_paths(paths, &ctx),
        _ => Map::new(),
    };
    out.insert("paths".into(), Value::Object(paths));

    let components = convert_components(&mut swagger, &ctx);
    if !components.is_empty() {
        out.insert("components".into(), Value::Object(components));
    }

    let mut converted = Value::Object(out);
    rewrite_refs(&mut converted);
    Ok(converted)
}

/// Builds `servers` from `host`, `basePath` and `schemes`.
fn convert_servers(swagger: &Map<String, Value>) -> Vec<Value> {
    let host = swagger.get("host").and_then(Value::as_str);
    let base_path = swagger
        .get("basePath")
        .and_then(Value::as_str)
        .unwrap_or("");

    if host.is_none() && base_path.is_empty() {
        return Vec::new();
    }
    let host = host.unwrap_or(DEFAULT_HOST);

    let mut schemes: Vec<&str> = swagger
        .get("schemes")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if schemes.is_empty() {
        schemes.push("https");
    }

    schemes
        .into_iter()
        .map(|scheme| json!({ "url": format!("{}://{}{}", scheme, host, base_path) }))
        .collect()
}

fn convert_paths(paths: Map<String, Value>, ctx: &ConversionContext<'_>) -> Map<String, Value> {
    paths
        .into_iter()
        .map(|(path, item)| {
            let item = match item {
                Value::Object(item) => Value::Object(convert_path_item(item, ctx)),
                other => other,
            };
            (path, item)
        })
        .collect()
}

fn convert_path_item(item: Map<String, Value>, ctx: &ConversionContext<'_>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in item {
        let converted = match (key.as_str(), value) {
            (method, Value::Object(op)) if HTTP_METHODS.contains(&method) => {
                Value::Object(convert_operation(op, ctx))
            }
            ("parameters", Value::Array(params)) => Value::Array(
                params
                    .into_iter()
                    .map(|p| ctx.inline_parameter(p))
                    .filter(|p| !is_body_or_form(p))
                    .map(convert_parameter)
                    .collect(),
            ),
            (_, other) => other,
        };
        out.insert(key, converted);
    }
    out
}

fn convert_operation(op: Map<String, Value>, ctx: &ConversionContext<'_>) -> Map<String, Value> {
    let consumes = media_types(op.get("consumes")).unwrap_or_else(|| ctx.consumes.clone());
    let produces = media_types(op.get("produces")).unwrap_or_else(|| ctx.produces.clone());

    let mut out = Map::new();
    let mut params = Vec::new();
    let mut body = None;
    let mut form = FormFields::default();

    for (key, value) in op {
        match key.as_str() {
            "parameters" => {
                for param in value.as_array().cloned().unwrap_or_default() {
                    let param = ctx.inline_parameter(param);
                    match param.get("in").and_then(Value::as_str) {
                        Some("body") => body = Some(body_request(&param, &consumes)),
                        Some("formData") => form.push(&param),
                        _ => params.push(convert_parameter(param)),
                    }
                }
            }
            "responses" => {
                out.insert(key, convert_responses(value, &produces));
            }
            "consumes" | "produces" | "schemes" => {}
            _ => {
                out.insert(key, value);
            }
        }
    }

    if !params.is_empty() {
        out.insert("parameters".into(), Value::Array(params));
    }
    if let Some(request_body) = body.or_else(|| form.into_request_body(&consumes)) {
        out.insert("requestBody".into(), request_body);
    }
    out
}

/// Moves the loose type keys of a non-body parameter into `schema`.
fn convert_parameter(param: Value) -> Value {
    let Value::Object(mut param) = param else {
        return param;
    };
    if param.contains_key("$ref") || param.contains_key("schema") {
        return Value::Object(param);
    }

    let schema = take_schema_keys(&mut param);
    param.remove("collectionFormat");
    if !schema.is_empty() {
        param.insert("schema".into(), Value::Object(schema));
    }
    Value::Object(param)
}

fn take_schema_keys(source: &mut Map<String, Value>) -> Map<String, Value> {
    let mut schema = Map::new();
    for key in SCHEMA_KEYS {
        if let Some(value) = source.remove(key) {
            schema.insert(key.into(), value);
        }
    }
    schema
}

fn body_request(param: &Value, consumes: &[String]) -> Value {
    let schema = param.get("schema").cloned().unwrap_or_else(|| json!({}));
    let content: Map<String, Value> = consumes
        .iter()
        .map(|mt| (mt.clone(), json!({ "schema": schema.clone() })))
        .collect();

    let mut body = Map::new();
    if let Some(description) = param.get("description") {
        body.insert("description".into(), description.clone());
    }
    if let Some(required) = param.get("required").filter(|v| v.is_boolean()) {
        body.insert("required".into(), required.clone());
    }
    body.insert("content".into(), Value::Object(content));
    Value::Object(body)
}

/// Accumulates `in: formData` parameters into one object schema.
#[derive(Default)]
struct FormFields {
    properties: Map<String, Value>,
    required: Vec<Value>,
    has_file: bool,
}

impl FormFields {
    fn push(&mut self, param: &Value) {
        let Some(param) = param.as_object() else {
            return;
        };
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            return;
        };

        let mut schema = param.clone();
        let mut property = take_schema_keys(&mut schema);
        if property.get("type").and_then(Value::as_str) == Some("file") {
            self.has_file = true;
            property.insert("type".into(), json!("string"));
            property.insert("format".into(), json!("binary"));
        }
        if let Some(description) = param.get("description") {
            property.insert("description".into(), description.clone());
        }
        if param.get("required").and_then(Value::as_bool) == Some(true) {
            self.required.push(json!(name));
        }
        self.properties
            .insert(name.to_string(), Value::Object(property));
    }

    fn into_request_body(self, consumes: &[String]) -> Option<Value> {
        if self.properties.is_empty() {
            return None;
        }
        let media = if self.has_file || consumes.iter().any(|mt| mt == MULTIPART) {
            MULTIPART
        } else {
            FORM_URLENCODED
        };

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(self.properties));
        if !self.required.is_empty() {
            schema.insert("required".into(), Value::Array(self.required));
        }
        Some(json!({ "content": { media: { "schema": Value::Object(schema) } } }))
    }
}

fn convert_responses(responses: Value, produces: &[String]) -> Value {
    match responses {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(code, resp)| (code, convert_response(resp, produces)))
                .collect(),
        ),
        other => other,
    }
}

fn convert_response(response: Value, produces: &[String]) -> Value {
    let Value::Object(mut response) = response else {
        return response;
    };
    if response.contains_key("$ref") {
        return Value::Object(response);
    }

    if !response.contains_key("description") {
        response.insert("description".into(), json!(""));
    }
    response.remove("examples");

    if let Some(schema) = response.remove("schema") {
        let content: Map<String, Value> = produces
            .iter()
            .map(|mt| (mt.clone(), json!({ "schema": schema.clone() })))
            .collect();
        response.insert("content".into(), Value::Object(content));
    }

    if let Some(Value::Object(headers)) = response.get_mut("headers") {
        for header in headers.values_mut() {
            if let Value::Object(header) = header {
                let schema = take_schema_keys(header);
                if !schema.is_empty() {
                    header.insert("schema".into(), Value::Object(schema));
                }
            }
        }
    }
    Value::Object(response)
}

fn convert_components(
    swagger: &mut Map<String, Value>,
    ctx: &ConversionContext<'_>,
) -> Map<String, Value> {
    let mut components = Map::new();

    if let Some(definitions) = swagger.remove("definitions") {
        components.insert("schemas".into(), definitions);
    }

    let parameters: Map<String, Value> = ctx
        .parameters
        .iter()
        .filter(|(_, p)| !is_body_or_form(p))
        .map(|(name, p)| (name.clone(), convert_parameter(p.clone())))
        .collect();
    if !parameters.is_empty() {
        components.insert("parameters".into(), Value::Object(parameters));
    }

    if let Some(Value::Object(responses)) = swagger.remove("responses") {
        let responses: Map<String, Value> = responses
            .into_iter()
            .map(|(name, r)| (name, convert_response(r, &ctx.produces)))
            .collect();
        components.insert("responses".into(), Value::Object(responses));
    }

    if let Some(Value::Object(schemes)) = swagger.remove("securityDefinitions") {
        let schemes: Map<String, Value> = schemes
            .into_iter()
            .map(|(name, s)| (name, convert_security_scheme(s)))
            .collect();
        components.insert("securitySchemes".into(), Value::Object(schemes));
    }

    components
}

fn convert_security_scheme(scheme: Value) -> Value {
    let Value::Object(mut scheme) = scheme else {
        return scheme;
    };

    match scheme.get("type").and_then(Value::as_str) {
        Some("basic") => {
            scheme.insert("type".into(), json!("http"));
            scheme.insert("scheme".into(), json!("basic"));
        }
        Some("oauth2") => {
            let flow = scheme
                .remove("flow")
                .and_then(|f| f.as_str().map(str::to_string));
            let mut flow_object = Map::new();
            for key in ["authorizationUrl", "tokenUrl"] {
                if let Some(url) = scheme.remove(key) {
                    flow_object.insert(key.into(), url);
                }
            }
            flow_object.insert(
                "scopes".into(),
                scheme.remove("scopes").unwrap_or_else(|| json!({})),
            );

            if let Some(flow) = flow {
                let flow_name = match flow.as_str() {
                    "application" => "clientCredentials",
                    "accessCode" => "authorizationCode",
                    other => other,
                };
                let mut flows = Map::new();
                flows.insert(flow_name.to_string(), Value::Object(flow_object));
                scheme.insert("flows".into(), Value::Object(flows));
            }
        }
        _ => {}
    }
    Value::Object(scheme)
}

/// Rewrites Swagger-local `$ref` prefixes to their OpenAPI 3 locations.
pub(crate) fn rewrite_refs(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get_mut("$ref") {
                let rewritten = REF_PREFIXES.iter().find_map(|(old, new)| {
                    reference
                        .strip_prefix(old)
                        .map(|rest| format!("{}{}", new, rest))
                });
                if let Some(rewritten) = rewritten {
                    *reference = rewritten;
                }
            }
            for child in map.values_mut() {
                rewrite_refs(child);
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                rewrite_refs(child);
            }
        }
        _ => {}
    }
}

fn is_body_or_form(param: &Value) -> bool {
    matches!(
        param.get("in").and_then(Value::as_str),
        Some("body") | Some("formData")
    )
}

/// Non-empty list of media types, if the value is one.
fn media_types(value: Option<&Value>) -> Option<Vec<String>> {
    let list: Vec<String> = value?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    (!list.is_empty()).then_some(list)
}

fn default_media_types() -> Vec<String> {
    vec![DEFAULT_MEDIA_TYPE.to_string()]
}
