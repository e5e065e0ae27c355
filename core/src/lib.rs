#![deny(missing_docs)]

//! # API Doc Core
//!
//! Library behind the `api-doc` tool. Reads an OpenAPI 3.x or Swagger 2.0
//! document, groups its paths into business resources, infers relationships
//! and API-wide conventions, and renders the result for people or models.
//!
//! ```no_run
//! use apidoc_core::{load_spec_file, render, AnalysisOptions, Analyzer, OutputFormat};
//!
//! # fn main() -> apidoc_core::AppResult<()> {
//! let spec = load_spec_file("openapi.yaml")?;
//! let analysis = Analyzer::new(AnalysisOptions::default()).analyze(&spec)?;
//! println!("{}", render(&analysis, OutputFormat::Markdown)?);
//! # Ok(())
//! # }
//! ```

/// Shared error types.
pub mod error;

/// OpenAPI document model, loading and Swagger 2.0 conversion.
pub mod spec;

/// Analysis result types.
pub mod models;

/// Resource, relationship and pattern inference.
pub mod analyzer;

/// Markdown, JSON and condensed text output.
pub mod reporter;

pub use analyzer::{AnalysisOptions, Analyzer, ResourceFilter};
pub use error::{AppError, AppResult};
pub use models::{
    AnalysisStat, ApiAnalysis, Confidence, DetailLevel, Field, FieldType, Pattern, PatternKind,
    Relationship, RelationshipKind, Resource, ResourceCategory, ResourceMap, Strength,
};
pub use reporter::{render, OutputFormat};
pub use spec::{load_spec_file, parse_spec, OpenApiSpec};
