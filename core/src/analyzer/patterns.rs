//! # Pattern Detection
//!
//! API-wide conventions (pagination, filtering, sorting, versioning, batch
//! endpoints, search, authentication). Each detector runs independently over
//! the whole document and yields at most one [`Pattern`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::{Confidence, Pattern, PatternKind};
use crate::spec::models::{OpenApiSpec, Parameter};

const PAGINATION_PARAMS: [&str; 9] = [
    "page",
    "pageNumber",
    "offset",
    "size",
    "pageSize",
    "per_page",
    "cursor",
    "next_token",
    "continuation_token",
];

const FILTER_WORDS: [&str; 17] = [
    "status", "type", "category", "tag", "role", "state", "created", "updated", "modified",
    "since", "before", "after", "min", "max", "from", "to", "between",
];
const FILTER_SUFFIXES: [&str; 3] = ["_id", "_at", "_date"];

const SORT_PARAMS: [&str; 7] = [
    "sort",
    "order",
    "orderBy",
    "sortBy",
    "sortOrder",
    "sortDirection",
    "orderDirection",
];

const SEARCH_PARAMS: [&str; 7] = ["q", "query", "search", "keyword", "term", "text", "find"];

const BATCH_PATH_MARKERS: [&str; 3] = [":batch", "/batch", "bulk"];
const BATCH_SUMMARY_WORDS: [&str; 3] = ["batch", "bulk", "multiple"];

const MAX_VERSION_EXAMPLES: usize = 3;
const MAX_AUTH_EXAMPLES: usize = 3;

/// Runs every detector, in a fixed order.
pub fn detect_patterns(spec: &OpenApiSpec) -> Vec<Pattern> {
    let patterns: Vec<Pattern> = [
        detect_pagination(spec),
        detect_filtering(spec),
        detect_sorting(spec),
        detect_versioning(spec),
        detect_batch_operations(spec),
        detect_search(spec),
        detect_authentication(spec),
    ]
    .into_iter()
    .flatten()
    .collect();

    debug!(
        patterns = ?patterns.iter().map(|p| p.kind.as_str()).collect::<Vec<_>>(),
        "Detected patterns"
    );
    patterns
}

/// Query parameters of every operation, path-level parameters merged in.
fn query_parameters(spec: &OpenApiSpec) -> impl Iterator<Item = (&str, Vec<&Parameter>)> + '_ {
    spec.paths.iter().flat_map(move |(path, item)| {
        item.operations().map(move |(_, op)| {
            let params = spec
                .operation_parameters(item, op)
                .into_iter()
                .filter(|p| p.is_query())
                .collect();
            (path.as_str(), params)
        })
    })
}

fn pattern(kind: PatternKind, description: String, examples: Vec<String>) -> Pattern {
    Pattern {
        kind,
        description,
        confidence: Confidence::from_example_count(examples.len()),
        examples,
        impact: kind.impact().to_string(),
    }
}

fn detect_pagination(spec: &OpenApiSpec) -> Option<Pattern> {
    let mut examples = Vec::new();
    let mut kinds = BTreeSet::new();

    for (path, params) in query_parameters(spec) {
        if !has_pagination_params(&params) {
            continue;
        }
        examples.push(path.to_string());
        for param in &params {
            match param.name.as_str() {
                "page" | "pageNumber" => kinds.insert("page-based"),
                "offset" => kinds.insert("offset-based"),
                "cursor" | "next_token" | "continuation_token" => kinds.insert("cursor-based"),
                _ => false,
            };
        }
    }

    if examples.is_empty() {
        return None;
    }
    let description = format!(
        "API uses pagination for list endpoints. Types detected: {}",
        kinds.into_iter().collect::<Vec<_>>().join(", ")
    );
    Some(pattern(PatternKind::Pagination, description, examples))
}

/// Two or more pagination parameters, or exactly one alongside `limit`.
pub fn has_pagination_params(params: &[&Parameter]) -> bool {
    let query = || params.iter().filter(|p| p.is_query());
    let found = query()
        .filter(|p| PAGINATION_PARAMS.contains(&p.name.as_str()))
        .count();
    found >= 2 || (found == 1 && query().any(|p| p.name == "limit"))
}

fn detect_filtering(spec: &OpenApiSpec) -> Option<Pattern> {
    let mut examples = Vec::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for (path, params) in query_parameters(spec) {
        let mut uses_filters = false;
        for param in params.iter().filter(|p| is_filter_param(&p.name)) {
            uses_filters = true;
            *counts.entry(param.name.clone()).or_default() += 1;
        }
        if uses_filters {
            examples.push(path.to_string());
        }
    }

    if examples.is_empty() {
        return None;
    }
    let common: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(name, _)| name)
        .collect();

    let mut description = String::from("API supports filtering on list endpoints");
    if !common.is_empty() {
        description.push_str(&format!(". Common filters: {}", common.join(", ")));
    }
    Some(pattern(PatternKind::Filtering, description, examples))
}

/// Substring match against common filter words, or an `_id`/`_at`/`_date` suffix.
pub fn is_filter_param(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTER_WORDS.iter().any(|w| lower.contains(w))
        || FILTER_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

fn detect_sorting(spec: &OpenApiSpec) -> Option<Pattern> {
    let mut examples = Vec::new();
    let mut names = BTreeSet::new();

    for (path, params) in query_parameters(spec) {
        if let Some(param) = params.iter().find(|p| is_sort_param(&p.name)) {
            examples.push(path.to_string());
            names.insert(param.name.clone());
        }
    }

    if examples.is_empty() {
        return None;
    }
    let description = format!(
        "API supports sorting on list endpoints using parameters: {}",
        names.into_iter().collect::<Vec<_>>().join(", ")
    );
    Some(pattern(PatternKind::Sorting, description, examples))
}

/// Exact, case-sensitive match against the usual sort parameter names.
pub fn is_sort_param(name: &str) -> bool {
    SORT_PARAMS.contains(&name)
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^v\d+$").expect("Invalid regex"))
}

/// First path segment of the form `v<digits>`.
pub fn extract_version(path: &str) -> Option<&str> {
    path.split('/').find(|segment| version_regex().is_match(segment))
}

fn detect_versioning(spec: &OpenApiSpec) -> Option<Pattern> {
    let mut first_path: BTreeMap<&str, &str> = BTreeMap::new();
    for path in spec.paths.keys() {
        if let Some(version) = extract_version(path) {
            first_path.entry(version).or_insert(path.as_str());
        }
    }

    if first_path.is_empty() {
        return None;
    }
    let versions: Vec<&str> = first_path.keys().copied().collect();
    let examples: Vec<String> = first_path
        .values()
        .take(MAX_VERSION_EXAMPLES)
        .map(|p| p.to_string())
        .collect();

    Some(Pattern {
        kind: PatternKind::Versioning,
        description: format!(
            "API uses URL path versioning. Versions found: {}",
            versions.join(", ")
        ),
        examples,
        confidence: Confidence::High,
        impact: PatternKind::Versioning.impact().to_string(),
    })
}

fn detect_batch_operations(spec: &OpenApiSpec) -> Option<Pattern> {
    let examples: Vec<String> = spec
        .paths
        .iter()
        .filter(|(path, item)| {
            BATCH_PATH_MARKERS.iter().any(|m| path.contains(m))
                || item.operations().any(|(_, op)| {
                    op.summary.as_deref().is_some_and(|summary| {
                        let lower = summary.to_lowercase();
                        BATCH_SUMMARY_WORDS.iter().any(|w| lower.contains(w))
                    })
                })
        })
        .map(|(path, _)| path.clone())
        .collect();

    if examples.is_empty() {
        return None;
    }
    Some(pattern(
        PatternKind::BatchOperations,
        "API supports batch operations for bulk create/update/delete".into(),
        examples,
    ))
}

fn detect_search(spec: &OpenApiSpec) -> Option<Pattern> {
    let mut examples = Vec::new();
    let mut names = BTreeSet::new();

    for (path, item) in &spec.paths {
        if path.contains("/search") {
            examples.push(path.clone());
            continue;
        }
        for (_, op) in item.operations() {
            let found = spec
                .operation_parameters(item, op)
                .into_iter()
                .find(|p| p.is_query() && is_search_param(&p.name));
            if let Some(param) = found {
                examples.push(path.clone());
                names.insert(param.name.clone());
            }
        }
    }

    if examples.is_empty() {
        return None;
    }
    let mut description = String::from("API provides search functionality");
    if !names.is_empty() {
        description.push_str(&format!(
            " using parameters: {}",
            names.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
    Some(pattern(PatternKind::Search, description, examples))
}

/// Exact match against the usual free-text search parameter names.
pub fn is_search_param(name: &str) -> bool {
    SEARCH_PARAMS.contains(&name)
}

fn detect_authentication(spec: &OpenApiSpec) -> Option<Pattern> {
    let labels: Vec<String> = spec
        .components
        .security_schemes
        .iter()
        .filter_map(|(name, scheme)| match scheme.scheme_type.as_str() {
            "http" => Some(match scheme.scheme.as_deref() {
                Some(s) if s.eq_ignore_ascii_case("bearer") => format!("Bearer token ({})", name),
                other => format!("HTTP {}", other.unwrap_or_default()),
            }),
            "apiKey" => Some(format!(
                "API Key in {}",
                scheme.location.as_deref().unwrap_or_default()
            )),
            "oauth2" => Some("OAuth 2.0".to_string()),
            "openIdConnect" => Some("OpenID Connect".to_string()),
            _ => None,
        })
        .collect();

    if labels.is_empty() {
        return None;
    }
    Some(Pattern {
        kind: PatternKind::Authentication,
        description: format!("API uses authentication: {}", labels.join(", ")),
        examples: spec.paths.keys().take(MAX_AUTH_EXAMPLES).cloned().collect(),
        confidence: Confidence::High,
        impact: PatternKind::Authentication.impact().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_spec;

    fn find(patterns: &[Pattern], kind: PatternKind) -> Option<&Pattern> {
        patterns.iter().find(|p| p.kind == kind)
    }

    fn query(name: &str) -> Parameter {
        Parameter {
            name: name.into(),
            location: "query".into(),
            ..Parameter::default()
        }
    }

    #[test]
    fn test_pagination_threshold() {
        let page = query("page");
        let limit = query("limit");
        let offset = query("offset");
        let cursor = query("cursor");
        assert!(has_pagination_params(&[&page, &limit]));
        assert!(has_pagination_params(&[&offset, &limit]));
        assert!(has_pagination_params(&[&page, &cursor]));
        assert!(!has_pagination_params(&[&limit]));
        assert!(!has_pagination_params(&[&page]));

        let header = Parameter {
            location: "header".into(),
            ..query("offset")
        };
        assert!(!has_pagination_params(&[&page, &header]));
    }

    #[test]
    fn test_param_predicates() {
        assert!(is_filter_param("status"));
        assert!(is_filter_param("createdAfter"));
        assert!(is_filter_param("owner_id"));
        assert!(is_filter_param("Published_At"));
        assert!(!is_filter_param("q"));
        assert!(is_sort_param("orderBy"));
        assert!(!is_sort_param("orderby"));
        assert!(is_search_param("q"));
        assert!(!is_search_param("Q"));
    }

    #[test]
    fn test_extract_version() {
        assert_eq!(extract_version("/api/v2/users"), Some("v2"));
        assert_eq!(extract_version("/v10"), Some("v10"));
        assert_eq!(extract_version("/video/v"), None);
        assert_eq!(extract_version("/users/v2beta"), None);
    }

    const DOC: &str = r#"
openapi: 3.0.0
info: {title: T, version: "1"}
paths:
  /v1/users:
    get:
      parameters:
        - {name: page, in: query}
        - {name: limit, in: query}
        - {name: status, in: query}
        - {name: sort, in: query}
  /v1/orders:
    get:
      parameters:
        - {name: offset, in: query}
        - {name: limit, in: query}
        - {name: status, in: query}
        - {name: q, in: query}
  /v2/orders:
    get:
      parameters:
        - {name: limit, in: query}
        - {name: created_at, in: query}
  /v2/orders:batch:
    post: {summary: Create orders}
  /v2/products/search:
    get: {}
  /v2/imports:
    post: {summary: Import MULTIPLE products}
components:
  securitySchemes:
    jwt: {type: http, scheme: bearer}
    basic: {type: http, scheme: basic}
    key: {type: apiKey, in: header, name: X-Key}
    oauth: {type: oauth2}
    oidc: {type: openIdConnect, openIdConnectUrl: "https://id.example.com"}
    custom: {type: mutualTLS}
"#;

    #[test]
    fn test_detect_patterns() {
        let spec = parse_spec(DOC).unwrap();
        let patterns = detect_patterns(&spec);
        let kinds: Vec<PatternKind> = patterns.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PatternKind::Pagination,
                PatternKind::Filtering,
                PatternKind::Sorting,
                PatternKind::Versioning,
                PatternKind::BatchOperations,
                PatternKind::Search,
                PatternKind::Authentication,
            ]
        );

        let pagination = find(&patterns, PatternKind::Pagination).unwrap();
        assert_eq!(pagination.examples, vec!["/v1/users", "/v1/orders"]);
        assert_eq!(pagination.confidence, Confidence::Medium);
        assert!(pagination.description.ends_with("offset-based, page-based"));

        let filtering = find(&patterns, PatternKind::Filtering).unwrap();
        assert_eq!(filtering.examples.len(), 3);
        assert_eq!(filtering.confidence, Confidence::High);
        assert!(filtering.description.ends_with("Common filters: status"));
        assert_eq!(
            filtering.impact,
            "Clients can filter results using query parameters"
        );

        let sorting = find(&patterns, PatternKind::Sorting).unwrap();
        assert_eq!(sorting.confidence, Confidence::Low);

        let versioning = find(&patterns, PatternKind::Versioning).unwrap();
        assert_eq!(versioning.examples, vec!["/v1/users", "/v2/orders"]);
        assert_eq!(versioning.confidence, Confidence::High);
        assert!(versioning.description.ends_with("v1, v2"));

        let batch = find(&patterns, PatternKind::BatchOperations).unwrap();
        assert_eq!(batch.examples, vec!["/v2/orders:batch", "/v2/imports"]);
        assert_eq!(batch.confidence, Confidence::Medium);

        let search = find(&patterns, PatternKind::Search).unwrap();
        assert_eq!(search.examples, vec!["/v1/orders", "/v2/products/search"]);
        assert_eq!(search.description, "API provides search functionality using parameters: q");

        let auth = find(&patterns, PatternKind::Authentication).unwrap();
        assert_eq!(
            auth.description,
            "API uses authentication: Bearer token (jwt), HTTP basic, API Key in header, OAuth 2.0, OpenID Connect"
        );
        assert_eq!(auth.examples.len(), 3);
        assert_eq!(auth.confidence, Confidence::High);
    }

    #[test]
    fn test_no_evidence_no_patterns() {
        let spec = parse_spec("openapi: 3.0.0\ninfo: {title: T, version: '1'}\npaths:\n  /things:\n    get: {}\n").unwrap();
        assert!(detect_patterns(&spec).is_empty());
    }

    #[test]
    fn test_single_example_is_low_confidence() {
        let doc = r#"
openapi: 3.0.0
info: {title: T, version: "1"}
paths:
  /items:
    get:
      parameters:
        - {name: sortBy, in: query}
        - {name: category, in: query}
"#;
        let spec = parse_spec(doc).unwrap();
        let patterns = detect_patterns(&spec);
        assert_eq!(patterns.len(), 2);
        assert!(patterns.iter().all(|p| p.confidence == Confidence::Low));
    }

    #[test]
    fn test_search_counts_each_operation() {
        let doc = r#"
openapi: 3.0.0
info: {title: T, version: "1"}
paths:
  /items:
    get:
      parameters:
        - {name: q, in: query}
        - {name: sort, in: query}
    post:
      parameters:
        - {name: q, in: query}
        - {name: sort, in: query}
  /items/search:
    get: {}
    post: {}
"#;
        let spec = parse_spec(doc).unwrap();
        let patterns = detect_patterns(&spec);

        let sorting = find(&patterns, PatternKind::Sorting).unwrap();
        assert_eq!(sorting.examples, vec!["/items", "/items"]);

        let search = find(&patterns, PatternKind::Search).unwrap();
        assert_eq!(search.examples, vec!["/items", "/items", "/items/search"]);
        assert_eq!(search.confidence, Confidence::High);
    }
}
