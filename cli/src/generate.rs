#![deny(missing_docs)]

//! # Generate Command
//!
//! Loads a document, analyzes it and writes the rendered result.

use std::fs;
use std::path::PathBuf;

use apidoc_core::{
    parse_spec, render, AnalysisOptions, Analyzer, DetailLevel, OutputFormat, ResourceFilter,
};
use clap::ValueEnum;
use tracing::info;

use crate::error::CliResult;
use crate::source::SpecSource;

/// Output format flag.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Markdown with a Mermaid relationship diagram.
    #[default]
    Markdown,
    /// Pretty-printed JSON.
    Json,
    /// Condensed text for language models.
    Ai,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Ai => OutputFormat::Ai,
        }
    }
}

/// Schema detail flag.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaArg {
    /// Identifiers, names and required fields only.
    Essential,
    /// Everything except timestamps and technical fields.
    #[default]
    Standard,
    /// Every field.
    Full,
}

impl From<SchemaArg> for DetailLevel {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::Essential => DetailLevel::Essential,
            SchemaArg::Standard => DetailLevel::Standard,
            SchemaArg::Full => DetailLevel::Full,
        }
    }
}

/// Arguments for documentation generation.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// OpenAPI/Swagger document: a file path, `-` for stdin, or an http(s) URL.
    #[clap(value_name = "SPEC")]
    pub spec: String,

    /// Write the output to this file instead of stdout.
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format.
    #[clap(short, long, value_enum, default_value_t, env = "API_DOC_FORMAT")]
    pub format: FormatArg,

    /// Schema detail level for resource fields.
    #[clap(short, long, value_enum, default_value_t, env = "API_DOC_SCHEMA")]
    pub schema: SchemaArg,

    /// Only include these resources (comma-separated).
    #[clap(short, long, value_name = "LIST")]
    pub include: Option<String>,

    /// Exclude these resources (comma-separated).
    #[clap(short, long, value_name = "LIST")]
    pub exclude: Option<String>,

    /// Only include resources whose name matches this regex.
    #[clap(long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Enable debug logging.
    #[clap(short, long)]
    pub verbose: bool,
}

impl GenerateArgs {
    /// Analysis options derived from the flags.
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            detail_level: self.schema.into(),
            filter: ResourceFilter {
                include: split_list(self.include.as_deref()),
                exclude: split_list(self.exclude.as_deref()),
                pattern: self.filter.clone().filter(|p| !p.is_empty()),
            },
        }
    }
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(list: Option<&str>) -> Vec<String> {
    list.map(|l| {
        l.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Runs the analysis and renders it to a string.
pub fn generate(args: &GenerateArgs) -> CliResult<String> {
    let source = SpecSource::parse(&args.spec);
    let content = source.read()?;
    let spec = parse_spec(&content)?;

    let analysis = Analyzer::new(args.analysis_options()).analyze(&spec)?;
    info!(
        resources = analysis.resources.len(),
        patterns = analysis.patterns.len(),
        format = %OutputFormat::from(args.format),
        "Rendering documentation"
    );
    Ok(render(&analysis, args.format.into())?)
}

/// Executes the command, writing to `--output` or stdout.
pub fn execute(args: &GenerateArgs) -> CliResult<()> {
    let output = generate(args)?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, output)?;
            println!("Documentation generated: {}", path.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}
