//! Per-language rendering of the planned models and routes.
//!
//! This module provides a unified interface for turning the shared
//! [`ModelPlan`] and [`RoutePlan`] into source files. Each target ecosystem
//! has its own emitter that owns a
//! [`TypeMapper`](crate::type_mapper::TypeMapper) and knows how its output is
//! laid out and formatted.
//!
//! # Supported Targets
//!
//! - **Python**: See [`python::PythonEmitter`]
//! - **TypeScript**: See [`typescript::TypeScriptEmitter`]
//!
//! # Example
//!
//! ```no_run
//! use openapi_scaffold::config::{GeneratorConfig, Target};
//! use openapi_scaffold::targets::emitter_for;
//!
//! let config = GeneratorConfig::default();
//! let emitter = emitter_for(Target::Python, &config);
//! for command in emitter.format_commands() {
//!     println!("{}", command);
//! }
//! ```

pub mod python;
pub mod typescript;

use crate::config::{GeneratorConfig, Target};
use crate::error::Result;
use crate::formatter::FormatCommand;
use crate::models::ModelPlan;
use crate::routes::RoutePlan;
use crate::staging::Artifact;

/// Everything an emitter renders from
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub models: &'a ModelPlan,
    pub routes: &'a RoutePlan,
    pub config: &'a GeneratorConfig,
}

/// Trait for rendering one target ecosystem.
///
/// Implementations must be deterministic: the same context always renders the
/// same artifacts, byte for byte.
pub trait TargetEmitter {
    fn target(&self) -> Target;

    /// Renders every file of this target.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The planned models and routes plus the active configuration
    ///
    /// # Returns
    ///
    /// Returns the artifacts to stage, with paths relative to the output root.
    fn render(&self, ctx: &RenderContext<'_>) -> Result<Vec<Artifact>>;

    /// Formatter invocations to try, in order, after the files are committed
    fn format_commands(&self) -> Vec<FormatCommand>;
}

/// The built-in emitter for `target`
pub fn emitter_for(target: Target, config: &GeneratorConfig) -> Box<dyn TargetEmitter> {
    match target {
        Target::Python => Box::new(python::PythonEmitter::new(config.python.clone())),
        Target::TypeScript => {
            Box::new(typescript::TypeScriptEmitter::new(config.typescript.clone()))
        }
    }
}

/// Whole numbers print without a fractional part
pub(crate) fn number_literal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Ordered, de-duplicated list of the component names referenced by `types`
pub(crate) fn referenced_types<'a>(
    types: impl IntoIterator<Item = &'a crate::schema::SchemaType>,
) -> Vec<String> {
    let mut refs = Vec::new();
    for ty in types {
        ty.references(&mut refs);
    }
    let mut names: Vec<String> = refs.into_iter().map(crate::naming::type_name).collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaType;

    #[test]
    fn test_number_literal() {
        assert_eq!(number_literal(0.0), "0");
        assert_eq!(number_literal(-5.0), "-5");
        assert_eq!(number_literal(2.5), "2.5");
    }

    #[test]
    fn test_referenced_types_are_sorted_and_unique() {
        let types = [
            SchemaType::Reference("Widget".to_string()),
            SchemaType::Array(Box::new(SchemaType::Reference("Gadget".to_string()))),
            SchemaType::Reference("Widget".to_string()),
        ];
        assert_eq!(referenced_types(&types), vec!["Gadget", "Widget"]);
    }

    #[test]
    fn test_emitter_for_selects_target() {
        let config = GeneratorConfig::default();
        assert_eq!(emitter_for(Target::Python, &config).target(), Target::Python);
        assert_eq!(emitter_for(Target::TypeScript, &config).target(), Target::TypeScript);
    }
}
