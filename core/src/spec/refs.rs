#![deny(missing_docs)]

//! # Reference Helpers
//!
//! Helper functions for local `$ref` strings (`#/components/...`).

/// Extracts the simple name from a reference string.
/// e.g. `#/components/schemas/User` -> `User`
pub fn extract_ref_name(ref_loc: &str) -> &str {
    ref_loc.rsplit('/').next().unwrap_or(ref_loc)
}

/// Returns the component name when `ref_loc` points into the given components section.
///
/// `component_name("#/components/parameters/Limit", "parameters")` yields `Some("Limit")`.
pub fn component_name<'a>(ref_loc: &'a str, section: &str) -> Option<&'a str> {
    ref_loc
        .strip_prefix("#/components/")?
        .strip_prefix(section)?
        .strip_prefix('/')
        .filter(|name| !name.is_empty() && !name.contains('/'))
}
