//! # Error Handling
//!
//! The `AppError` enum shared by the loader, analyzer and reporter.

use derive_more::{Display, From};

/// Every failure the core can report.
///
/// Display and From impls come from `derive_more`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The document could not be read as JSON/YAML or does not fit the spec model.
    #[from(ignore)]
    #[display("Parse Error: {_0}")]
    Parse(String),

    /// The document declares an OpenAPI/Swagger version we do not handle.
    #[from(ignore)]
    #[display("Unsupported Version: {_0}")]
    UnsupportedVersion(String),

    /// The document is structurally unusable (no version marker, no `info`, empty).
    #[from(ignore)]
    #[display("Invalid Spec: {_0}")]
    InvalidSpec(String),

    /// The resource filter pattern is not a valid regular expression.
    #[display("Invalid resource filter: {_0}")]
    InvalidFilter(regex::Error),

    /// JSON rendering failure.
    #[display("Serialization Error: {_0}")]
    Serialization(serde_json::Error),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
