#![deny(missing_docs)]

//! # Analysis Models
//!
//! The condensed view produced by the analyzer: resources with their
//! operations, relationships and fields, plus API-wide patterns and summary
//! statistics. Everything serializes to camelCase JSON.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

pub use crate::spec::models::HttpMethod;

/// Resources keyed by name. Ordered so that every downstream pass is deterministic.
pub type ResourceMap = BTreeMap<String, Resource>;

/// A logical API entity (users, orders, ...) and everything attributed to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Resource name, taken verbatim from the path segment.
    pub name: String,
    /// Generated one-line description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Operations attributed to this resource, in document order.
    pub operations: Vec<Operation>,
    /// Outgoing relationships. Unique per `(resource, type, via)`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    /// Fields merged from matching component schemas.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    /// Coarse classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ResourceCategory>,
    /// Whether some path ends in the resource's own segment.
    pub is_collection: bool,
}

impl Resource {
    /// Creates an empty resource with the generated description.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("{} resource operations", capitalize(&name)),
            name,
            operations: Vec::new(),
            relationships: Vec::new(),
            fields: Vec::new(),
            category: None,
            is_collection: false,
        }
    }

    /// Whether an equivalent relationship is already recorded.
    pub fn has_relationship(&self, target: &str, kind: &RelationshipKind, via: &str) -> bool {
        self.relationships
            .iter()
            .any(|r| r.resource == target && &r.kind == kind && r.via == via)
    }

    /// Records a relationship unless one with the same `(resource, type, via)` exists.
    /// Returns whether it was added.
    pub fn add_relationship(&mut self, relationship: Relationship) -> bool {
        if self.has_relationship(&relationship.resource, &relationship.kind, &relationship.via) {
            return false;
        }
        self.relationships.push(relationship);
        true
    }
}

/// Resource classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    /// Regular entity with addressable instances.
    Core,
    /// Lives under an `admin` path segment.
    Admin,
    /// Never addressed by identifier (health checks, search endpoints, ...).
    Utility,
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceCategory::Core => "core",
            ResourceCategory::Admin => "admin",
            ResourceCategory::Utility => "utility",
        })
    }
}

/// A single HTTP operation attributed to a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template, e.g. `/users/{id}`.
    pub path: String,
    /// Short summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Long description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Effective parameters (path-level merged, references resolved).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<OperationParameter>,
    /// Request body summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyInfo>,
    /// Responses, in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<ResponseInfo>,
    /// Deprecation flag.
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
}

impl Operation {
    /// Creates an operation with no metadata.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            summary: None,
            description: None,
            operation_id: None,
            tags: Vec::new(),
            parameters: Vec::new(),
            request_body: None,
            responses: Vec::new(),
            deprecated: false,
        }
    }
}

/// Parameter summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationParameter {
    /// Parameter name.
    pub name: String,
    /// Location (`query`, `path`, `header`, `cookie`).
    #[serde(rename = "in")]
    pub location: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Required flag.
    pub required: bool,
    /// Value type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
}

/// Request body summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBodyInfo {
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Required flag.
    pub required: bool,
    /// Media types offered, in document order.
    pub content_types: Vec<String>,
    /// Payload type, taken from the first media type with a schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<FieldType>,
}

/// Response summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInfo {
    /// Status code or `default`.
    pub status_code: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Media types offered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content_types: Vec<String>,
    /// Payload type, taken from the first media type with a schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<FieldType>,
}

/// A directed edge between two resources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    /// Target resource name.
    pub resource: String,
    /// Edge kind.
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    /// The path segment, parameter or property that evidences the edge.
    pub via: String,
    /// Human description.
    pub description: String,
    /// Evidence strength.
    pub strength: Strength,
}

/// Relationship kinds. Unknown kinds are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// One-to-many, owner side.
    HasMany,
    /// One-to-many, child side.
    BelongsTo,
    /// Holds a reference to the target.
    References,
    /// Is referenced by the target.
    ReferencedBy,
    /// Anything else.
    Other(String),
}

impl RelationshipKind {
    /// Wire name (`has_many`, `belongs_to`, ...).
    pub fn as_str(&self) -> &str {
        match self {
            RelationshipKind::HasMany => "has_many",
            RelationshipKind::BelongsTo => "belongs_to",
            RelationshipKind::References => "references",
            RelationshipKind::ReferencedBy => "referenced_by",
            RelationshipKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RelationshipKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Strength of the evidence behind a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// Structural evidence (path nesting, `$ref`).
    Strong,
    /// Naming evidence (`*_id` parameters and properties).
    Medium,
    /// Inverse of a naming match.
    Weak,
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strength::Strong => "strong",
            Strength::Medium => "medium",
            Strength::Weak => "weak",
        })
    }
}

/// An API-wide convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    /// Pattern kind.
    #[serde(rename = "type")]
    pub kind: PatternKind,
    /// What was found.
    pub description: String,
    /// Example paths or labels.
    pub examples: Vec<String>,
    /// Confidence level.
    pub confidence: Confidence,
    /// What the pattern means for clients.
    pub impact: String,
}

/// The conventions the pattern detector knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Page/offset/cursor pagination.
    Pagination,
    /// Query filters.
    Filtering,
    /// Sort parameters.
    Sorting,
    /// Version path segments.
    Versioning,
    /// Bulk endpoints.
    BatchOperations,
    /// Search endpoints and parameters.
    Search,
    /// Security schemes.
    Authentication,
}

impl PatternKind {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Pagination => "pagination",
            PatternKind::Filtering => "filtering",
            PatternKind::Sorting => "sorting",
            PatternKind::Versioning => "versioning",
            PatternKind::BatchOperations => "batch_operations",
            PatternKind::Search => "search",
            PatternKind::Authentication => "authentication",
        }
    }

    /// Heading used in rendered documentation.
    pub fn title(&self) -> &'static str {
        match self {
            PatternKind::Pagination => "Pagination",
            PatternKind::Filtering => "Filtering",
            PatternKind::Sorting => "Sorting",
            PatternKind::Versioning => "Versioning",
            PatternKind::BatchOperations => "Batch Operations",
            PatternKind::Search => "Search",
            PatternKind::Authentication => "Authentication",
        }
    }

    /// Client-facing consequence of the pattern.
    pub fn impact(&self) -> &'static str {
        match self {
            PatternKind::Pagination => {
                "Clients should implement pagination handling for list operations"
            }
            PatternKind::Filtering => "Clients can filter results using query parameters",
            PatternKind::Sorting => "Clients can sort results using query parameters",
            PatternKind::Versioning => "Clients should be aware of API version compatibility",
            PatternKind::BatchOperations => {
                "Clients can perform bulk operations for better performance"
            }
            PatternKind::Search => "Clients can perform full-text or field-based searches",
            PatternKind::Authentication => "Clients must implement proper authentication handling",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence attached to a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Seen often.
    High,
    /// Seen twice.
    Medium,
    /// Seen once.
    Low,
}

impl Confidence {
    /// `>= 3` examples is high, `2` is medium, anything else low.
    pub fn from_example_count(count: usize) -> Self {
        match count {
            n if n >= 3 => Confidence::High,
            2 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        })
    }
}

/// A flattened schema property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Name; nested properties use dotted paths (`address.city`).
    pub name: String,
    /// Type information.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Listed in the parent's `required`.
    pub required: bool,
    /// Example rendered as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Deprecation flag.
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
}

/// Type description of a field, parameter or payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldType {
    /// Type name. For `$ref` schemas, the referenced schema name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Format hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Array element type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<FieldType>>,
    /// The raw `$ref`.
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// String enumeration values.
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// Regex constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Minimum length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Numeric minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Numeric maximum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl FieldType {
    /// Compact label: `string(email)`, `array<User>`, `User`.
    pub fn label(&self) -> String {
        match (&self.items, &self.format) {
            (Some(items), _) if self.type_name == "array" => format!("array<{}>", items.label()),
            (_, Some(format)) => format!("{}({})", self.type_name, format),
            _ => self.type_name.clone(),
        }
    }
}

/// The complete analysis result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAnalysis {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// First server URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Resources after filtering, sorted by name.
    pub resources: Vec<Resource>,
    /// Detected patterns.
    pub patterns: Vec<Pattern>,
    /// Summary statistics over the output resources.
    pub summary: AnalysisStat,
    /// When the analysis ran.
    pub generated_at: DateTime<Utc>,
    /// `OpenAPI 3.0.3` or `Swagger 2.0 (converted)`.
    pub spec_type: String,
    /// Path count of the input document.
    pub original_paths: usize,
}

/// Summary statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStat {
    /// Number of output resources.
    pub total_resources: usize,
    /// Operations across output resources.
    pub total_operations: usize,
    /// Path templates in the input document.
    pub total_endpoints: usize,
    /// Share of input paths with at least one operation in an output resource, `0..=100`.
    pub resource_coverage: u8,
}

/// How much schema detail survives reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DetailLevel {
    /// Required, identifier, status and contact fields only.
    Essential,
    /// Drops technical and timestamp noise.
    #[default]
    Standard,
    /// Everything.
    Full,
}

impl DetailLevel {
    /// Lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::Essential => "essential",
            DetailLevel::Standard => "standard",
            DetailLevel::Full => "full",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper-cases the first character.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}
