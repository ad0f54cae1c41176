//! routedoc - command-line tool for generating OpenAPI documents.
//!
//! Reads a route manifest, resolves the request and response models it names
//! from Rust source, and prints the resulting OpenAPI 3.0 document.
//!
//! # Usage
//!
//! ```bash
//! routedoc [OPTIONS] <MODELS_PATH> <MANIFEST>
//! ```
//!
//! Generate YAML to stdout:
//! ```bash
//! routedoc ./src/models routes.yaml
//! ```
//!
//! Generate JSON to a file, with debug logging:
//! ```bash
//! routedoc ./src/models routes.yaml -f json -o openapi.json -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use routedoc::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("routedoc starting...");
    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;
    info!("OpenAPI document generation completed successfully");

    Ok(())
}
