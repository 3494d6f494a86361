//! Generator configuration.
//!
//! A [`GeneratorConfig`] is read from an optional YAML file and then adjusted by
//! command-line flags. Every field has a default, so an empty file (or no file)
//! produces a working configuration with the built-in binding table.

use crate::binding::Binding;
use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How unresolved `$ref` targets are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferencePolicy {
    /// Fail the run with an unresolved-reference error
    #[default]
    Strict,
    /// Replace the reference with the generic type and log a warning
    Lenient,
}

/// What happens when two operations sharing a tag derive different prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrefixTieBreak {
    /// Keep the prefix of the first operation in schema order
    #[default]
    FirstSeen,
    /// Fail the run with a prefix-conflict error
    Reject,
}

/// How operations without a service binding are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingPolicy {
    /// Emit a "not implemented" stub and log a warning
    #[default]
    Lenient,
    /// Fail the run, listing every unbound operation
    Strict,
}

/// Output target ecosystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// pydantic models and FastAPI routers
    Python,
    /// TypeScript interfaces and fetch-based client helpers
    #[value(name = "typescript")]
    TypeScript,
}

/// Output locations and module names for the Python target
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PythonOptions {
    pub models_path: PathBuf,
    pub routes_path: PathBuf,
    /// Import path of the generated models module
    pub models_module: String,
}

impl Default for PythonOptions {
    fn default() -> Self {
        Self {
            models_path: PathBuf::from("app/generated/generated_models.py"),
            routes_path: PathBuf::from("app/generated/generated_router.py"),
            models_module: "app.generated.generated_models".to_string(),
        }
    }
}

/// Output locations and client defaults for the TypeScript target
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TypeScriptOptions {
    pub types_path: PathBuf,
    pub client_path: PathBuf,
    /// Module specifier the client file uses to import the types file
    pub types_import: String,
    pub base_url_env: String,
    pub default_base_url: String,
}

impl Default for TypeScriptOptions {
    fn default() -> Self {
        Self {
            types_path: PathBuf::from("generated/api-types.ts"),
            client_path: PathBuf::from("generated/api-client.ts"),
            types_import: "./api-types".to_string(),
            base_url_env: "NEXT_PUBLIC_API_URL".to_string(),
            default_base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Complete generator configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Path prefix that marks versioned operations
    pub api_prefix: String,
    pub reference_policy: ReferencePolicy,
    pub prefix_tie_break: PrefixTieBreak,
    pub binding_policy: BindingPolicy,
    pub targets: Vec<Target>,
    /// Directory all output paths are relative to
    pub out_dir: PathBuf,
    pub python: PythonOptions,
    pub typescript: TypeScriptOptions,
    /// Service bindings; `None` selects the built-in table
    pub bindings: Option<Vec<Binding>>,
    /// Run the code formatters after committing output
    pub format: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api/v1".to_string(),
            reference_policy: ReferencePolicy::default(),
            prefix_tie_break: PrefixTieBreak::default(),
            binding_policy: BindingPolicy::default(),
            targets: vec![Target::Python, Target::TypeScript],
            out_dir: PathBuf::from("."),
            python: PythonOptions::default(),
            typescript: TypeScriptOptions::default(),
            bindings: None,
            format: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty file deserializes to `null`, which means "all defaults"
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: GeneratorConfig =
            serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_prefix.starts_with('/') || self.api_prefix.ends_with('/') {
            return Err(Error::Config(format!(
                "api_prefix must start with '/' and must not end with '/': `{}`",
                self.api_prefix
            )));
        }
        if self.targets.is_empty() {
            return Err(Error::Config("at least one target is required".to_string()));
        }
        Ok(())
    }
}
