use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

use crate::config::{BindingPolicy, GeneratorConfig, PrefixTieBreak, ReferencePolicy, Target};
use crate::pipeline::{Generator, StageOutcome};
use crate::scanner::SchemaScanner;

/// Schema read when neither `--schema` nor `--schema-dir` is given
pub const DEFAULT_SCHEMA: &str = "source/openapi.yaml";

/// OpenAPI scaffold generator - pydantic/FastAPI backend code and TypeScript client types from one schema
#[derive(Parser, Debug)]
#[command(name = "openapi-scaffold")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Schema document to read; repeat to merge several in order
    #[arg(short = 's', long = "schema", value_name = "FILE")]
    pub schemas: Vec<PathBuf>,

    /// Directory scanned for more schema documents (*.yaml, *.yml, *.json)
    #[arg(long = "schema-dir", value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,

    /// Generator configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Root directory for generated files
    #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Target to generate; repeat for several (default: all)
    #[arg(short = 't', long = "target", value_enum)]
    pub targets: Vec<Target>,

    /// Path prefix of versioned operations (default: /api/v1)
    #[arg(long = "api-prefix", value_name = "PREFIX")]
    pub api_prefix: Option<String>,

    /// Fail on references to undeclared components
    #[arg(long = "strict-refs", conflicts_with = "lenient_refs")]
    pub strict_refs: bool,

    /// Replace references to undeclared components with the generic type
    #[arg(long = "lenient-refs")]
    pub lenient_refs: bool,

    /// Fail when an operation has no service binding
    #[arg(long = "strict-bindings")]
    pub strict_bindings: bool,

    /// Fail when operations sharing a tag derive different router prefixes
    #[arg(long = "reject-prefix-conflicts")]
    pub reject_prefix_conflicts: bool,

    /// Do not run code formatters on the generated files
    #[arg(long = "no-format")]
    pub no_format: bool,

    /// Render everything and list the files without writing them
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(mut args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if args.schemas.is_empty() && args.schema_dir.is_none() {
        args.schemas.push(PathBuf::from(DEFAULT_SCHEMA));
    }

    for schema in &args.schemas {
        if !schema.is_file() {
            anyhow::bail!("Schema file does not exist: {}", schema.display());
        }
    }

    if let Some(ref dir) = args.schema_dir {
        if !dir.is_dir() {
            anyhow::bail!("Schema directory is not a directory: {}", dir.display());
        }
    }

    if let Some(ref config) = args.config {
        if !config.is_file() {
            anyhow::bail!("Config file does not exist: {}", config.display());
        }
    }

    for schema in &args.schemas {
        info!("Schema: {}", schema.display());
    }
    if let Some(ref dir) = args.schema_dir {
        info!("Schema directory: {}", dir.display());
    }
    if args.targets.is_empty() {
        info!("Targets: from configuration");
    } else {
        info!("Targets: {:?}", args.targets);
    }
    if args.dry_run {
        info!("Dry run: nothing will be written");
    }

    Ok(args)
}

/// Build the generator configuration: config file first, then flags
pub fn build_config(args: &CliArgs) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    if let Some(ref out_dir) = args.out_dir {
        config.out_dir = out_dir.clone();
    }
    if !args.targets.is_empty() {
        config.targets = args.targets.clone();
    }
    if let Some(ref prefix) = args.api_prefix {
        config.api_prefix = prefix.clone();
    }
    if args.strict_refs {
        config.reference_policy = ReferencePolicy::Strict;
    }
    if args.lenient_refs {
        config.reference_policy = ReferencePolicy::Lenient;
    }
    if args.strict_bindings {
        config.binding_policy = BindingPolicy::Strict;
    }
    if args.reject_prefix_conflicts {
        config.prefix_tie_break = PrefixTieBreak::Reject;
    }
    if args.no_format {
        config.format = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Explicit schemas first, then scanned ones not already listed
pub fn collect_sources(args: &CliArgs) -> Result<Vec<PathBuf>> {
    let mut sources = args.schemas.clone();

    if let Some(ref dir) = args.schema_dir {
        info!("Scanning {} for schema documents...", dir.display());
        let scan_result = SchemaScanner::new(dir.clone())
            .scan()
            .with_context(|| format!("Failed to scan {}", dir.display()))?;
        for warning in &scan_result.warnings {
            warn!("{}", warning);
        }
        for file in scan_result.schema_files {
            if !sources.contains(&file) {
                sources.push(file);
            }
        }
    }

    if sources.is_empty() {
        anyhow::bail!("No schema documents found");
    }
    Ok(sources)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting code generation...");

    let config = build_config(&args)?;
    let sources = collect_sources(&args)?;
    let generator = Generator::new(config).context("Failed to set up the generator")?;

    info!("Loading {} schema document(s)...", sources.len());
    let doc = generator
        .load(&sources)
        .context("Failed to load the schema")?;
    info!(
        "Loaded {} component(s) and {} operation(s)",
        doc.components.len(),
        doc.operations().count()
    );

    if args.dry_run {
        let stage = generator.render(&doc).context("Generation failed")?;
        for artifact in stage.artifacts() {
            println!(
                "{} ({} bytes)",
                stage.destination(&artifact.path).display(),
                artifact.contents.len()
            );
        }
        info!("Dry run complete: {} file(s) rendered", stage.len());
        return Ok(());
    }

    let report = generator.generate(&doc).context("Generation failed")?;

    info!("Generation complete!");
    info!("Summary:");
    for stage in &report.stages {
        match &stage.outcome {
            StageOutcome::Done(detail) => info!("  - {}: {}", stage.stage, detail),
            StageOutcome::Skipped(reason) => info!("  - {}: skipped ({})", stage.stage, reason),
            StageOutcome::Warning(message) => warn!("  - {}: {}", stage.stage, message),
        }
    }
    for path in &report.written {
        info!("  Wrote {}", path.display());
    }

    Ok(())
}
