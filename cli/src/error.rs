#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use apidoc_core::AppError;
use derive_more::{Display, From};

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// Loading, analysis or rendering failed.
    #[display("{}", _0)]
    Core(AppError),

    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// The document could not be downloaded.
    #[from(ignore)]
    #[display("Fetch Error: {}", _0)]
    Fetch(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
