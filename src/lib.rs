//! OpenAPI scaffold generator - backend and client code from one schema.
//!
//! This library reads an OpenAPI 3.x document and deterministically generates
//! code for two ecosystems from a single planned model of the schema:
//!
//! - **Python**: pydantic model classes and FastAPI routers whose handlers
//!   either delegate to a bound service function or raise "not implemented"
//! - **TypeScript**: interfaces mirroring the models plus an endpoint table, a
//!   fetch-based `ApiClient` and one typed helper per operation
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`loader`] - Parses schema text into a [`schema::SchemaDocument`]
//! 2. [`scanner`] - Finds schema documents in a directory tree
//! 3. [`type_mapper`] - Maps schema types to target type expressions
//! 4. [`models`] - Plans one declaration per component
//! 5. [`topology`] - Groups operations into routers and derives prefixes
//! 6. [`binding`] - Maps operation identifiers to service functions
//! 7. [`routes`] - Plans one handler per (path, verb)
//! 8. [`targets`] - Renders the plans for each target
//! 9. [`staging`] - Holds rendered files and commits them atomically
//! 10. [`formatter`] - Runs the target's code formatter, best effort
//! 11. [`pipeline`] - Sequences all of the above
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_scaffold::config::GeneratorConfig;
//! use openapi_scaffold::pipeline::Generator;
//! use std::path::PathBuf;
//!
//! let config = GeneratorConfig {
//!     out_dir: PathBuf::from("./my-app"),
//!     ..GeneratorConfig::default()
//! };
//! let generator = Generator::new(config).unwrap();
//! let report = generator.run(&[PathBuf::from("source/openapi.yaml")]).unwrap();
//! for path in &report.written {
//!     println!("wrote {}", path.display());
//! }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod binding;
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod loader;
pub mod models;
pub mod naming;
pub mod pipeline;
pub mod routes;
pub mod scanner;
pub mod schema;
pub mod staging;
pub mod targets;
pub mod topology;
pub mod type_mapper;
