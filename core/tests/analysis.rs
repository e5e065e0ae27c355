use apidoc_core::{
    load_spec_file, parse_spec, render, AnalysisOptions, Analyzer, ApiAnalysis, DetailLevel,
    OutputFormat, PatternKind, RelationshipKind, ResourceCategory, ResourceFilter,
};
use pretty_assertions::assert_eq;
use std::fs;

const PROJECTS_YAML: &str = r#"
openapi: 3.0.3
info:
  title: Projects API
  version: 4.2.0
  description: Organizations, projects and their tasks.
servers:
  - url: https://api.example.com
paths:
  /organizations:
    get:
      summary: List organizations
      parameters:
        - {name: page, in: query, schema: {type: integer}}
        - {name: limit, in: query, schema: {type: integer}}
  /organizations/{org_id}:
    get: {summary: Get organization}
  /organizations/{org_id}/projects/{project_id}/tasks:
    parameters:
      - {name: org_id, in: path, required: true, schema: {type: string}}
      - {name: project_id, in: path, required: true, schema: {type: string}}
    get:
      summary: List tasks
      parameters:
        - {name: status, in: query, schema: {type: string, enum: [open, done]}}
        - {name: sort, in: query, schema: {type: string}}
    post:
      summary: Create task
      requestBody:
        required: true
        content:
          application/json:
            schema: {$ref: '#/components/schemas/Task'}
      responses:
        '201':
          description: Created
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Task'}
  /organizations/{org_id}/projects/{project_id}/tasks/{task_id}/archive:
    post: {summary: Archive task}
  /v1/auth/login:
    post: {summary: Log in}
  /v1/auth/api-keys/{id}:
    delete: {summary: Revoke key}
components:
  schemas:
    Task:
      type: object
      required: [id, title]
      properties:
        id: {type: string, format: uuid}
        title: {type: string}
        notes: {type: string}
        updated_at: {type: string, format: date-time}
        assignee:
          type: object
          properties:
            email: {type: string, format: email}
            nickname: {type: string}
  securitySchemes:
    bearer: {type: http, scheme: bearer}
"#;

fn analyze(yaml: &str, options: AnalysisOptions) -> ApiAnalysis {
    let spec = parse_spec(yaml).expect("fixture parses");
    Analyzer::new(options).analyze(&spec).expect("analysis succeeds")
}

fn resource_names(analysis: &ApiAnalysis) -> Vec<&str> {
    analysis.resources.iter().map(|r| r.name.as_str()).collect()
}

fn operation_paths<'a>(analysis: &'a ApiAnalysis, name: &str) -> Vec<&'a str> {
    analysis
        .resources
        .iter()
        .find(|r| r.name == name)
        .map(|r| r.operations.iter().map(|op| op.path.as_str()).collect())
        .unwrap_or_default()
}

#[test]
fn test_nested_attribution_and_actions() {
    let analysis = analyze(PROJECTS_YAML, AnalysisOptions::default());

    assert_eq!(
        resource_names(&analysis),
        vec!["api-keys", "auth", "organizations", "projects", "tasks"]
    );
    assert!(operation_paths(&analysis, "tasks")
        .contains(&"/organizations/{org_id}/projects/{project_id}/tasks/{task_id}/archive"));
    assert!(operation_paths(&analysis, "organizations")
        .contains(&"/organizations/{org_id}/projects/{project_id}/tasks"));
    assert_eq!(operation_paths(&analysis, "auth"), vec!["/v1/auth/login"]);
    assert_eq!(
        operation_paths(&analysis, "api-keys"),
        vec!["/v1/auth/api-keys/{id}"]
    );
    assert_eq!(analysis.summary.resource_coverage, 100);
    assert_eq!(analysis.summary.total_endpoints, 6);
}

#[test]
fn test_relationships_from_path_hierarchy() {
    let analysis = analyze(PROJECTS_YAML, AnalysisOptions::default());
    let projects = analysis
        .resources
        .iter()
        .find(|r| r.name == "projects")
        .unwrap();

    assert!(projects.has_relationship("tasks", &RelationshipKind::HasMany, "path hierarchy"));
    assert!(projects.has_relationship(
        "organizations",
        &RelationshipKind::BelongsTo,
        "path hierarchy"
    ));
    let tasks = analysis.resources.iter().find(|r| r.name == "tasks").unwrap();
    assert!(!tasks
        .relationships
        .iter()
        .any(|r| r.resource == "archive"));
}

#[test]
fn test_fields_follow_detail_level() {
    let fields = |level| {
        let options = AnalysisOptions {
            detail_level: level,
            ..AnalysisOptions::default()
        };
        let analysis = analyze(PROJECTS_YAML, options);
        let tasks = analysis.resources.into_iter().find(|r| r.name == "tasks").unwrap();
        tasks.fields.into_iter().map(|f| f.name).collect::<Vec<_>>()
    };

    assert_eq!(
        fields(DetailLevel::Essential),
        vec!["id", "title", "assignee", "assignee.email"]
    );
    assert_eq!(
        fields(DetailLevel::Standard),
        vec!["id", "title", "notes", "assignee", "assignee.email", "assignee.nickname"]
    );
    assert_eq!(fields(DetailLevel::Full).len(), 7);
}

#[test]
fn test_categories() {
    let analysis = analyze(PROJECTS_YAML, AnalysisOptions::default());
    let category = |name: &str| {
        analysis
            .resources
            .iter()
            .find(|r| r.name == name)
            .and_then(|r| r.category)
    };
    assert_eq!(category("tasks"), Some(ResourceCategory::Core));
    assert_eq!(category("auth"), Some(ResourceCategory::Utility));
    assert_eq!(category("projects"), Some(ResourceCategory::Core));
}

#[test]
fn test_patterns() {
    let analysis = analyze(PROJECTS_YAML, AnalysisOptions::default());
    let kinds: Vec<PatternKind> = analysis.patterns.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PatternKind::Pagination,
            PatternKind::Filtering,
            PatternKind::Sorting,
            PatternKind::Versioning,
            PatternKind::Authentication,
        ]
    );
}

#[test]
fn test_filtered_view() {
    let options = AnalysisOptions {
        filter: ResourceFilter {
            pattern: Some("^(auth|api-)".into()),
            exclude: vec!["API-KEYS".into()],
            ..ResourceFilter::default()
        },
        ..AnalysisOptions::default()
    };
    let analysis = analyze(PROJECTS_YAML, options);
    assert_eq!(resource_names(&analysis), vec!["auth"]);
    assert_eq!(analysis.summary.total_resources, 1);
    assert_eq!(analysis.summary.total_operations, 1);
    assert_eq!(analysis.original_paths, 6);
}

const PETSTORE_SWAGGER: &str = r##"{
  "swagger": "2.0",
  "info": {"title": "Petstore", "version": "1.0.0"},
  "host": "petstore.example.com",
  "basePath": "/v1",
  "schemes": ["https"],
  "paths": {
    "/pets": {
      "get": {
        "summary": "List pets",
        "parameters": [
          {"name": "offset", "in": "query", "type": "integer"},
          {"name": "limit", "in": "query", "type": "integer"}
        ],
        "responses": {"200": {"description": "ok", "schema": {"type": "array", "items": {"$ref": "#/definitions/Pet"}}}}
      },
      "post": {
        "summary": "Create a pet",
        "parameters": [{"name": "body", "in": "body", "required": true, "schema": {"$ref": "#/definitions/Pet"}}],
        "responses": {"201": {"description": "created"}}
      }
    },
    "/pets/{petId}": {
      "get": {
        "parameters": [{"name": "petId", "in": "path", "required": true, "type": "string"}],
        "responses": {"200": {"description": "ok", "schema": {"$ref": "#/definitions/Pet"}}}
      }
    }
  },
  "definitions": {
    "Pet": {
      "type": "object",
      "required": ["id", "name"],
      "properties": {
        "id": {"type": "integer", "format": "int64"},
        "name": {"type": "string"},
        "tag": {"type": "string"}
      }
    }
  },
  "securityDefinitions": {
    "key": {"type": "apiKey", "name": "X-API-Key", "in": "header"}
  }
}"##;

#[test]
fn test_swagger_document_end_to_end() {
    let analysis = analyze(PETSTORE_SWAGGER, AnalysisOptions::default());

    assert_eq!(analysis.spec_type, "Swagger 2.0 (converted)");
    assert_eq!(
        analysis.base_url.as_deref(),
        Some("https://petstore.example.com/v1")
    );
    assert_eq!(resource_names(&analysis), vec!["pets"]);

    let pets = &analysis.resources[0];
    assert!(pets.is_collection);
    assert_eq!(pets.operations.len(), 3);
    let field_names: Vec<&str> = pets.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(field_names, vec!["id", "name", "tag"]);

    let create = pets
        .operations
        .iter()
        .find(|op| op.summary.as_deref() == Some("Create a pet"))
        .unwrap();
    let body = create.request_body.as_ref().unwrap();
    assert!(body.required);
    assert_eq!(body.content_types, vec!["application/json"]);
    assert_eq!(body.schema.as_ref().unwrap().type_name, "Pet");

    let auth = analysis
        .patterns
        .iter()
        .find(|p| p.kind == PatternKind::Authentication)
        .unwrap();
    assert_eq!(auth.description, "API uses authentication: API Key in header");
}

#[test]
fn test_json_rendering_uses_camel_case() {
    let analysis = analyze(PETSTORE_SWAGGER, AnalysisOptions::default());
    let json = render(&analysis, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["title"], "Petstore");
    assert_eq!(value["specType"], "Swagger 2.0 (converted)");
    assert_eq!(value["summary"]["resourceCoverage"], 100);
    assert_eq!(value["resources"][0]["isCollection"], true);
    assert_eq!(value["resources"][0]["operations"][0]["method"], "GET");
    assert!(value["generatedAt"].is_string());
}

#[test]
fn test_markdown_and_ai_rendering() {
    let analysis = analyze(PROJECTS_YAML, AnalysisOptions::default());

    let markdown = render(&analysis, OutputFormat::Markdown).unwrap();
    assert!(markdown.starts_with("# Projects API\n"));
    assert!(markdown.contains("```mermaid\ngraph TD\n"));
    assert!(markdown.contains("    projects -->|has_many| tasks\n"));

    let ai = render(&analysis, OutputFormat::Ai).unwrap();
    assert!(ai.starts_with("API: Projects API v4.2.0 (OpenAPI 3.0.3)\n"));
    assert!(ai.contains("KEY OPERATIONS:\n"));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("petstore.json");
    fs::write(&path, PETSTORE_SWAGGER).unwrap();

    let spec = load_spec_file(&path).unwrap();
    assert_eq!(spec.paths.len(), 2);
    assert!(load_spec_file(dir.path().join("missing.yaml")).is_err());
}
