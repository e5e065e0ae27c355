#![deny(missing_docs)]

//! # OpenAPI Document Model
//!
//! - **models**: Typed, lenient view over an OpenAPI 3.x document.
//! - **loader**: JSON/YAML parsing, version detection and normalization.
//! - **convert**: Swagger 2.0 to OpenAPI 3.0 upgrade.
//! - **refs**: `$ref` string helpers.

pub mod convert;
pub mod loader;
pub mod models;
pub mod refs;

pub use loader::{load_spec_file, parse_spec};
pub use models::{
    Components, HttpMethod, Info, MediaType, OpenApiSpec, Operation, Parameter, PathItem,
    RequestBody, Response, Schema, SecurityScheme, Server, Tag,
};
pub use refs::extract_ref_name;
