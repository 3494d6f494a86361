//! OpenAPI scaffold generator - command-line tool.
//!
//! Reads one or more OpenAPI documents and writes pydantic models, FastAPI
//! router scaffolding, TypeScript interfaces and a fetch-based client.
//!
//! # Usage
//!
//! ```bash
//! openapi-scaffold [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Generate everything from `source/openapi.yaml` into the current directory:
//! ```bash
//! openapi-scaffold
//! ```
//!
//! Merge two documents and generate only the TypeScript client:
//! ```bash
//! openapi-scaffold -s api.yaml -s admin.yaml -t typescript -o web
//! ```
//!
//! List what would be written, with verbose logging:
//! ```bash
//! openapi-scaffold --dry-run -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_scaffold::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI scaffold generator starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Code generation completed successfully");

    Ok(())
}
