#![deny(missing_docs)]

//! # Spec Sources
//!
//! Resolves the `<SPEC>` argument into document text: a file path, `-` for
//! stdin, or an `http(s)` URL.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use url::Url;

use crate::error::{CliError, CliResult};

/// Where the document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    /// A local file.
    File(PathBuf),
    /// Standard input.
    Stdin,
    /// A remote document.
    Url(Url),
}

impl SpecSource {
    /// Classifies a command line argument.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            return SpecSource::Stdin;
        }
        match Url::parse(arg) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => SpecSource::Url(url),
            _ => SpecSource::File(PathBuf::from(arg)),
        }
    }

    /// Reads the full document text.
    pub fn read(&self) -> CliResult<String> {
        match self {
            SpecSource::File(path) => Ok(fs::read_to_string(path)?),
            SpecSource::Stdin => {
                let mut content = String::new();
                std::io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
            SpecSource::Url(url) => fetch(url),
        }
    }
}

#[cfg(feature = "client")]
fn fetch(url: &Url) -> CliResult<String> {
    tracing::info!(%url, "Fetching specification");
    let mut response = ureq::get(url.as_str())
        .call()
        .map_err(|e| CliError::Fetch(format!("{}: {}", url, e)))?;
    response
        .body_mut()
        .read_to_string()
        .map_err(|e| CliError::Fetch(format!("{}: {}", url, e)))
}

#[cfg(not(feature = "client"))]
fn fetch(url: &Url) -> CliResult<String> {
    Err(CliError::Fetch(format!(
        "{}: built without the `client` feature",
        url
    )))
}
