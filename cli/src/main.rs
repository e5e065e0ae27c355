#![deny(missing_docs)]

//! # API Doc CLI
//!
//! Generates condensed, resource-oriented documentation from OpenAPI 3.x and
//! Swagger 2.0 documents.
//!
//! ```text
//! api-doc openapi.yaml -f ai -s essential --include users,orders
//! ```

use std::process::ExitCode;

use clap::Parser;

mod error;
mod generate;
mod logging;
mod source;

#[derive(Parser, Debug)]
#[clap(
    name = "api-doc",
    author,
    version,
    about = "Resource-oriented documentation for OpenAPI specifications"
)]
struct Cli {
    #[clap(flatten)]
    args: generate::GenerateArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.args.verbose);

    match generate::execute(&cli.args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
