//! # Relationship Detection
//!
//! Infers edges between resources from three independent sources of evidence:
//! path nesting, foreign-key style path parameters, and component schema
//! properties. Every pass only adds edges and [`Resource::add_relationship`]
//! rejects duplicates, so detection can be re-run safely.

use tracing::debug;

use crate::analyzer::path::{path_variables, tokenize, PathToken};
use crate::models::{Relationship, RelationshipKind, Resource, ResourceMap, Strength};
use crate::spec::models::OpenApiSpec;

/// `via` value for edges implied by path nesting.
pub const PATH_HIERARCHY: &str = "path hierarchy";

const SCHEMA_SUFFIXES: [&str; 5] = ["response", "request", "schema", "model", "dto"];

/// Runs every detection pass and returns the number of edges added.
pub fn detect_relationships(resources: &mut ResourceMap, spec: &OpenApiSpec) -> usize {
    let added = detect_path_relationships(resources, spec)
        + detect_parameter_relationships(resources)
        + detect_schema_relationships(resources, spec);
    debug!(added, "Detected relationships");
    added
}

/// `/parents/{id}/children` yields `parents has_many children` and the inverse.
fn detect_path_relationships(resources: &mut ResourceMap, spec: &OpenApiSpec) -> usize {
    let mut edges = Vec::new();
    for path in spec.paths.keys() {
        let tokens = tokenize(path);
        for window in tokens.windows(3) {
            if let [PathToken::Literal(parent), PathToken::Variable(_), PathToken::Literal(child)] =
                window
            {
                if resources.contains_key(parent) && resources.contains_key(child) {
                    edges.push((parent.clone(), child.clone()));
                }
            }
        }
    }

    let mut added = 0;
    for (parent, child) in edges {
        added += usize::from(add_relationship(
            resources,
            &parent,
            &child,
            RelationshipKind::HasMany,
            PATH_HIERARCHY,
            Strength::Strong,
        ));
        added += usize::from(add_relationship(
            resources,
            &child,
            &parent,
            RelationshipKind::BelongsTo,
            PATH_HIERARCHY,
            Strength::Strong,
        ));
    }
    added
}

/// `{userId}` in a path owned by `orders` yields `users has_many orders`
/// and `orders references users`, provided a `user` resource exists.
fn detect_parameter_relationships(resources: &mut ResourceMap) -> usize {
    let mut edges = Vec::new();
    for resource in resources.values() {
        for op in &resource.operations {
            for param in path_variables(&op.path) {
                let Some(prefix) = foreign_key_prefix(&param) else {
                    continue;
                };
                let target = prefix.to_lowercase();
                if resources.contains_key(&target) {
                    edges.push((resource.name.clone(), target, param));
                }
            }
        }
    }

    let mut added = 0;
    for (owner, target, param) in edges {
        added += usize::from(add_relationship(
            resources,
            &target,
            &owner,
            RelationshipKind::HasMany,
            &param,
            Strength::Medium,
        ));
        added += usize::from(add_relationship(
            resources,
            &owner,
            &target,
            RelationshipKind::References,
            &param,
            Strength::Medium,
        ));
    }
    added
}

/// Scans component schemas that map onto a resource for `$ref`,
/// array-of-`$ref` and foreign-key named properties.
fn detect_schema_relationships(resources: &mut ResourceMap, spec: &OpenApiSpec) -> usize {
    struct Edge {
        from: String,
        to: String,
        kind: RelationshipKind,
        via: String,
        strength: Strength,
    }

    let mut edges = Vec::new();
    for (schema_name, schema) in &spec.components.schemas {
        if schema.properties.is_empty() {
            continue;
        }
        let source = schema_to_resource_name(schema_name);
        if !resources.contains_key(&source) {
            continue;
        }

        for (property, prop) in &schema.properties {
            let mut edge = |from: &str, to: &str, kind, strength| {
                edges.push(Edge {
                    from: from.to_string(),
                    to: to.to_string(),
                    kind,
                    via: property.clone(),
                    strength,
                })
            };

            if let Some(target) = prop.ref_name().map(schema_to_resource_name) {
                if resources.contains_key(&target) {
                    edge(&source, &target, RelationshipKind::References, Strength::Strong);
                }
            }

            let item_target = prop
                .items
                .as_deref()
                .filter(|_| prop.is_type("array"))
                .and_then(|items| items.ref_name())
                .map(schema_to_resource_name);
            if let Some(target) = item_target {
                if resources.contains_key(&target) {
                    edge(&source, &target, RelationshipKind::HasMany, Strength::Strong);
                    edge(&target, &source, RelationshipKind::BelongsTo, Strength::Strong);
                }
            }

            if let Some(prefix) = foreign_key_prefix(property) {
                let target = prefix.to_lowercase();
                if resources.contains_key(&target) {
                    edge(&source, &target, RelationshipKind::References, Strength::Medium);
                    edge(&target, &source, RelationshipKind::ReferencedBy, Strength::Weak);
                }
            }
        }
    }

    edges
        .into_iter()
        .map(|e| {
            usize::from(add_relationship(
                resources, &e.from, &e.to, e.kind, &e.via, e.strength,
            ))
        })
        .sum()
}

fn add_relationship(
    resources: &mut ResourceMap,
    from: &str,
    to: &str,
    kind: RelationshipKind,
    via: &str,
    strength: Strength,
) -> bool {
    let Some(source) = resources.get_mut(from) else {
        return false;
    };
    let description = describe_relationship(from, to, &kind);
    source.add_relationship(Relationship {
        resource: to.to_string(),
        kind,
        via: via.to_string(),
        description,
        strength,
    })
}

/// The owner part of a foreign-key name.
///
/// Matches names ending in `_id` or `Id` (case-sensitive) with a non-empty
/// prefix: `user_id` and `userId` both give `user`; `id`, `_id` and `paid` give
/// nothing.
pub fn foreign_key_prefix(name: &str) -> Option<&str> {
    name.strip_suffix("_id")
        .or_else(|| name.strip_suffix("Id"))
        .filter(|prefix| !prefix.is_empty())
}

/// Maps a schema name onto a resource name: lower-case, then strip the first
/// matching suffix of `response`, `request`, `schema`, `model`, `dto`.
///
/// `UserResponse` gives `userresponse` -> `user`; `Orders` gives `orders`.
pub fn schema_to_resource_name(schema_name: &str) -> String {
    let lower = schema_name.to_lowercase();
    SCHEMA_SUFFIXES
        .iter()
        .find_map(|suffix| lower.strip_suffix(suffix))
        .map(str::to_string)
        .unwrap_or(lower)
}

/// Human sentence for an edge.
pub fn describe_relationship(from: &str, to: &str, kind: &RelationshipKind) -> String {
    match kind {
        RelationshipKind::HasMany => format!("{} contains multiple {} resources", from, to),
        RelationshipKind::BelongsTo => format!("{} belongs to a {} resource", from, to),
        RelationshipKind::References => format!("{} references a {} resource", from, to),
        RelationshipKind::ReferencedBy => format!("{} is referenced by {} resources", from, to),
        RelationshipKind::Other(kind) => {
            format!("{} has a {} relationship with {}", from, kind, to)
        }
    }
}

/// Relationships of `resource` in a stable order, for rendering.
pub fn sorted_relationships(resource: &Resource) -> Vec<&Relationship> {
    let mut rels: Vec<&Relationship> = resource.relationships.iter().collect();
    rels.sort_by(|a, b| {
        (a.resource.as_str(), a.kind.as_str(), a.via.as_str()).cmp(&(
            b.resource.as_str(),
            b.kind.as_str(),
            b.via.as_str(),
        ))
    });
    rels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::resource::extract_resources;
    use crate::spec::parse_spec;

    const DOC: &str = r##"
openapi: 3.0.0
info: {title: Shop, version: "1"}
paths:
  /users:
    get: {}
  /users/{id}:
    get: {}
  /users/{id}/orders:
    get: {}
  /orders/{orderId}:
    get: {}
  /products/{product_id}:
    get: {}
  /reviews/{productId}:
    get: {}
components:
  schemas:
    OrderResponse:
      type: object
      properties:
        buyer: {$ref: "#/components/schemas/User"}
        lines:
          type: array
          items: {$ref: "#/components/schemas/ProductModel"}
        user_id: {type: string}
    User:
      type: object
      properties:
        name: {type: string}
"##;

    fn analyzed() -> ResourceMap {
        let spec = parse_spec(DOC).unwrap();
        let mut resources = extract_resources(&spec);
        detect_relationships(&mut resources, &spec);
        resources
    }

    fn has(resources: &ResourceMap, from: &str, to: &str, kind: RelationshipKind, via: &str) -> bool {
        resources[from].has_relationship(to, &kind, via)
    }

    #[test]
    fn test_path_hierarchy() {
        let r = analyzed();
        assert!(has(&r, "users", "orders", RelationshipKind::HasMany, PATH_HIERARCHY));
        assert!(has(&r, "orders", "users", RelationshipKind::BelongsTo, PATH_HIERARCHY));
        let rel = r["users"]
            .relationships
            .iter()
            .find(|rel| rel.via == PATH_HIERARCHY)
            .unwrap();
        assert_eq!(rel.strength, Strength::Strong);
        assert_eq!(rel.description, "users contains multiple orders resources");
    }

    #[test]
    fn test_parameter_foreign_keys() {
        let r = analyzed();
        // `productId` lowercases to `product`, which is not a resource name
        assert!(!r["reviews"]
            .relationships
            .iter()
            .any(|rel| rel.via == "productId"));
        // `orderId` -> `order` does not exist either
        assert!(!r["orders"].relationships.iter().any(|rel| rel.via == "orderId"));
    }

    #[test]
    fn test_parameter_foreign_key_match() {
        let doc = r#"
openapi: 3.0.0
info: {title: T, version: "1"}
paths:
  /user/{id}:
    get: {}
  /posts/{userId}:
    get: {}
"#;
        let spec = parse_spec(doc).unwrap();
        let mut r = extract_resources(&spec);
        detect_relationships(&mut r, &spec);
        assert!(has(&r, "user", "posts", RelationshipKind::HasMany, "userId"));
        assert!(has(&r, "posts", "user", RelationshipKind::References, "userId"));
        let rel = &r["posts"].relationships[0];
        assert_eq!(rel.strength, Strength::Medium);
        assert_eq!(rel.description, "posts references a user resource");
    }

    #[test]
    fn test_schema_references() {
        let r = analyzed();
        // OrderResponse -> order: no such resource, so the schema is skipped
        assert!(!has(&r, "orders", "users", RelationshipKind::References, "buyer"));
    }

    #[test]
    fn test_schema_references_on_matching_resource() {
        let doc = r##"
openapi: 3.0.0
info: {title: T, version: "1"}
paths:
  /order/{id}:
    get: {}
  /user/{id}:
    get: {}
  /product/{id}:
    get: {}
components:
  schemas:
    OrderDTO:
      type: object
      properties:
        buyer: {$ref: "#/components/schemas/UserResponse"}
        lines:
          type: array
          items: {$ref: "#/components/schemas/ProductModel"}
        user_id: {type: string}
"##;
        let spec = parse_spec(doc).unwrap();
        let mut r = extract_resources(&spec);
        detect_relationships(&mut r, &spec);

        assert!(has(&r, "order", "user", RelationshipKind::References, "buyer"));
        assert!(has(&r, "order", "product", RelationshipKind::HasMany, "lines"));
        assert!(has(&r, "product", "order", RelationshipKind::BelongsTo, "lines"));
        assert!(has(&r, "order", "user", RelationshipKind::References, "user_id"));
        assert!(has(&r, "user", "order", RelationshipKind::ReferencedBy, "user_id"));

        let referenced_by = r["user"]
            .relationships
            .iter()
            .find(|rel| rel.kind == RelationshipKind::ReferencedBy)
            .unwrap();
        assert_eq!(referenced_by.strength, Strength::Weak);
        assert_eq!(referenced_by.description, "user is referenced by order resources");
    }

    #[test]
    fn test_detection_is_idempotent() {
        let spec = parse_spec(DOC).unwrap();
        let mut resources = extract_resources(&spec);
        let first = detect_relationships(&mut resources, &spec);
        let snapshot = resources.clone();
        let second = detect_relationships(&mut resources, &spec);
        assert!(first > 0);
        assert_eq!(second, 0);
        assert_eq!(resources, snapshot);
    }

    #[test]
    fn test_foreign_key_prefix() {
        assert_eq!(foreign_key_prefix("user_id"), Some("user"));
        assert_eq!(foreign_key_prefix("userId"), Some("user"));
        assert_eq!(foreign_key_prefix("id"), None);
        assert_eq!(foreign_key_prefix("_id"), None);
        assert_eq!(foreign_key_prefix("Id"), None);
        assert_eq!(foreign_key_prefix("paid"), None);
        assert_eq!(foreign_key_prefix("userID"), None);
    }

    #[test]
    fn test_schema_to_resource_name() {
        assert_eq!(schema_to_resource_name("UserResponse"), "user");
        assert_eq!(schema_to_resource_name("CreateOrderRequest"), "createorder");
        assert_eq!(schema_to_resource_name("PetDTO"), "pet");
        assert_eq!(schema_to_resource_name("users"), "users");
        assert_eq!(schema_to_resource_name("ModelSchema"), "model");
    }

    #[test]
    fn test_describe_fallback() {
        assert_eq!(
            describe_relationship("a", "b", &RelationshipKind::Other("owns".into())),
            "a has a owns relationship with b"
        );
    }
}
