#![deny(missing_docs)]

//! # Analyzer
//!
//! Turns a parsed [`OpenApiSpec`] into an [`ApiAnalysis`]:
//!
//! 1. compile the resource filter,
//! 2. extract resources from path structure,
//! 3. detect relationships between them,
//! 4. attach schema fields,
//! 5. detect API-wide patterns,
//! 6. apply the filter view and assemble the result.
//!
//! The passes are plain functions over a locally owned [`ResourceMap`]; the
//! [`Analyzer`] only carries configuration.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::{AnalysisStat, ApiAnalysis, DetailLevel, Resource};
use crate::spec::models::OpenApiSpec;

/// Schema field attachment.
pub mod fields;
/// Include/exclude/regex resource filtering.
pub mod filter;
/// Path template tokenization.
pub mod path;
/// API-wide pattern detection.
pub mod patterns;
/// Relationship inference.
pub mod relationship;
/// Resource extraction and attribution.
pub mod resource;
/// Detail-level schema reduction.
pub mod schema_reducer;

pub use fields::{attach_fields, candidate_schema_names, merge_fields};
pub use filter::{ResourceFilter, ResourceFilterer};
pub use patterns::detect_patterns;
pub use relationship::detect_relationships;
pub use resource::{analyze_path_patterns, extract_resources, resources_for_path, PathPattern};
pub use schema_reducer::{reduce_schema, schema_to_fields};

const DEFAULT_TITLE: &str = "API Documentation";
const DEFAULT_VERSION: &str = "1.0.0";

/// Analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Schema detail kept in resource fields.
    pub detail_level: DetailLevel,
    /// Which resources appear in the output.
    pub filter: ResourceFilter,
}

/// Runs the analysis pipeline with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    options: AnalysisOptions,
}

impl Analyzer {
    /// Creates an analyzer.
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    /// Analyzes `spec`.
    ///
    /// The only failure is an invalid filter regex, reported before any
    /// extraction work happens.
    pub fn analyze(&self, spec: &OpenApiSpec) -> AppResult<ApiAnalysis> {
        let filterer = ResourceFilterer::new(&self.options.filter)?;

        let mut resources = extract_resources(spec);
        let edges = detect_relationships(&mut resources, spec);
        attach_fields(&mut resources, spec, self.options.detail_level);
        let patterns = detect_patterns(spec);

        let selected: Vec<Resource> = filterer
            .filter(resources.values())
            .into_iter()
            .cloned()
            .collect();
        if !self.options.filter.is_empty() {
            info!(
                filter = %self.options.filter,
                kept = selected.len(),
                total = resources.len(),
                "Applied resource filter"
            );
        }
        debug!(relationships = edges, patterns = patterns.len(), "Analysis complete");

        let summary = summarize(&selected, spec);
        Ok(ApiAnalysis {
            title: non_empty(spec.info.title.as_deref()).unwrap_or(DEFAULT_TITLE).to_string(),
            version: non_empty(spec.info.version.as_deref())
                .unwrap_or(DEFAULT_VERSION)
                .to_string(),
            description: non_empty(spec.info.description.as_deref()).map(str::to_string),
            base_url: spec.base_url().map(str::to_string),
            resources: selected,
            patterns,
            summary,
            generated_at: Utc::now(),
            spec_type: spec.spec_type(),
            original_paths: spec.paths.len(),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Summary statistics over the output resources.
///
/// Coverage is the share of the document's paths that have at least one
/// operation in an output resource, capped at 100.
pub fn summarize(resources: &[Resource], spec: &OpenApiSpec) -> AnalysisStat {
    let total_endpoints = spec.paths.len();
    let covered: HashSet<&str> = resources
        .iter()
        .flat_map(|r| r.operations.iter().map(|op| op.path.as_str()))
        .collect();

    let resource_coverage = if total_endpoints == 0 {
        0
    } else {
        (covered.len() * 100 / total_endpoints).min(100) as u8
    };

    AnalysisStat {
        total_resources: resources.len(),
        total_operations: resources.iter().map(|r| r.operations.len()).sum(),
        total_endpoints,
        resource_coverage,
    }
}
