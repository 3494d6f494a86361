//! The generation pipeline.
//!
//! [`Generator`] ties the stages together: load, validate bindings, plan
//! models, plan topology, plan routes, render every target into an
//! [`OutputStage`], commit, format. Any failure before the commit leaves the
//! output directory untouched.

use crate::binding::{BindingTable, ServiceBindingResolver};
use crate::config::{GeneratorConfig, Target};
use crate::error::{Error, Result};
use crate::formatter::{FormatOutcome, Formatter, FormatterWarning};
use crate::loader::SchemaLoader;
use crate::models::ModelPlan;
use crate::routes::{self, RoutePlan};
use crate::schema::SchemaDocument;
use crate::staging::OutputStage;
use crate::targets::{emitter_for, RenderContext, TargetEmitter};
use crate::topology::RouteTopology;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Bindings,
    Models,
    Topology,
    Routes,
    Render(Target),
    Commit,
    Format(Target),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load => f.write_str("load"),
            Stage::Bindings => f.write_str("bindings"),
            Stage::Models => f.write_str("models"),
            Stage::Topology => f.write_str("topology"),
            Stage::Routes => f.write_str("routes"),
            Stage::Render(target) => write!(f, "render {:?}", target),
            Stage::Commit => f.write_str("commit"),
            Stage::Format(target) => write!(f, "format {:?}", target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Completed, with a short summary
    Done(String),
    Skipped(String),
    /// Completed with a non-fatal problem
    Warning(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

/// Summary of one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub stages: Vec<StageReport>,
    /// Committed files, absolute or relative to the working directory
    pub written: Vec<PathBuf>,
    pub warnings: Vec<FormatterWarning>,
}

impl GenerationReport {
    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| &r.outcome)
    }

    fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        debug!("Stage {}: {:?}", stage, outcome);
        self.stages.push(StageReport { stage, outcome });
    }
}

/// A rendered but uncommitted run
pub struct Rendered {
    pub stage: OutputStage,
    /// Staged paths of each target, for formatting after commit
    pub files: Vec<(Target, Vec<PathBuf>)>,
    pub report: GenerationReport,
}

/// Runs the pipeline for one configuration
pub struct Generator {
    config: GeneratorConfig,
    bindings: BindingTable,
    emitters: Vec<Box<dyn TargetEmitter>>,
}

impl Generator {
    /// Creates a generator with the built-in emitter of every configured target.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration is invalid or binds
    /// an operation identifier twice.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let mut emitters: Vec<Box<dyn TargetEmitter>> = Vec::new();
        for target in &config.targets {
            if emitters.iter().any(|e| e.target() == *target) {
                continue;
            }
            emitters.push(emitter_for(*target, &config));
        }
        Self::with_emitters(config, emitters)
    }

    /// Creates a generator with caller-supplied emitters
    pub fn with_emitters(
        config: GeneratorConfig,
        emitters: Vec<Box<dyn TargetEmitter>>,
    ) -> Result<Self> {
        config.validate()?;
        if emitters.is_empty() {
            return Err(Error::Config("at least one target is required".to_string()));
        }
        let bindings = match &config.bindings {
            Some(list) => BindingTable::new(list.clone())?,
            None => BindingTable::builtin(),
        };
        debug!("Using {} service binding(s)", bindings.len());
        Ok(Self {
            config,
            bindings,
            emitters,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn loader(&self) -> SchemaLoader {
        SchemaLoader::new(self.config.reference_policy)
    }

    /// Loads and merges schema documents in order.
    ///
    /// # Errors
    ///
    /// Returns an error if no source is given, if any document fails to load,
    /// or if two documents declare the same operation.
    pub fn load(&self, sources: &[PathBuf]) -> Result<SchemaDocument> {
        let Some((first, rest)) = sources.split_first() else {
            return Err(Error::Config("no schema documents given".to_string()));
        };
        let loader = self.loader();
        let mut doc = loader.load_file(first)?;
        for path in rest {
            debug!("Merging {}", path.display());
            doc.merge(loader.load_file(path)?)?;
        }
        Ok(doc)
    }

    /// Loads `sources`, then generates, commits and formats.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage up to and including the commit.
    /// Formatting problems are reported as warnings.
    pub fn run(&self, sources: &[PathBuf]) -> Result<GenerationReport> {
        let doc = self.load(sources)?;
        let mut report = self.generate(&doc)?;
        report.stages.insert(
            0,
            StageReport {
                stage: Stage::Load,
                outcome: StageOutcome::Done(format!(
                    "{} document(s), {} component(s), {} operation(s)",
                    sources.len(),
                    doc.components.len(),
                    doc.operations().count()
                )),
            },
        );
        Ok(report)
    }

    /// Generates, commits and formats an already loaded document
    pub fn generate(&self, doc: &SchemaDocument) -> Result<GenerationReport> {
        let Rendered {
            stage,
            files,
            mut report,
        } = self.render_staged(doc)?;

        let root = stage.root().to_path_buf();
        report.written = stage.commit()?;
        report.record(
            Stage::Commit,
            StageOutcome::Done(format!("{} file(s)", report.written.len())),
        );

        for (target, paths) in files {
            if !self.config.format {
                report.record(
                    Stage::Format(target),
                    StageOutcome::Skipped("formatting disabled".to_string()),
                );
                continue;
            }
            let Some(emitter) = self.emitters.iter().find(|e| e.target() == target) else {
                continue;
            };
            // paths are relative to the output root, which is the formatter's cwd
            let outcome = match Formatter::format(
                target,
                &emitter.format_commands(),
                &paths,
                &format_dir(&root),
            ) {
                FormatOutcome::Formatted { command } => StageOutcome::Done(command),
                FormatOutcome::NoFiles => StageOutcome::Skipped("no files".to_string()),
                FormatOutcome::Skipped(warning) => {
                    let message = warning.message.clone();
                    report.warnings.push(warning);
                    StageOutcome::Warning(message)
                }
            };
            report.record(Stage::Format(target), outcome);
        }

        info!(
            "Generated {} file(s) with {} formatter warning(s)",
            report.written.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Everything except commit and formatting.
    ///
    /// # Returns
    ///
    /// The staged artifacts, ready to inspect or commit.
    ///
    /// # Errors
    ///
    /// Returns binding, name-collision or prefix-conflict errors; nothing is
    /// written in any case.
    pub fn render(&self, doc: &SchemaDocument) -> Result<OutputStage> {
        Ok(self.render_staged(doc)?.stage)
    }

    /// Like [`Generator::render`], also returning the per-target file lists and
    /// the stage reports so far
    pub fn render_staged(&self, doc: &SchemaDocument) -> Result<Rendered> {
        let mut report = GenerationReport::default();

        let ids = routes::operation_ids(doc);
        self.bindings
            .validate(ids.iter().map(String::as_str), self.config.binding_policy)?;
        report.record(
            Stage::Bindings,
            StageOutcome::Done(format!(
                "{} of {} operation(s) bound",
                ids.iter().filter(|id| self.bindings.get(id).is_some()).count(),
                ids.len()
            )),
        );

        let models = ModelPlan::from_document(doc)?;
        report.record(
            Stage::Models,
            StageOutcome::Done(format!("{} declaration(s)", models.declarations.len())),
        );

        let topology =
            RouteTopology::resolve(doc, &self.config.api_prefix, self.config.prefix_tie_break)?;
        report.record(
            Stage::Topology,
            StageOutcome::Done(format!("{} router group(s)", topology.groups().len())),
        );

        let resolver = ServiceBindingResolver::new(&self.bindings);
        let plan = RoutePlan::build(doc, topology, &resolver);
        report.record(
            Stage::Routes,
            StageOutcome::Done(format!("{} route(s)", plan.routes.len())),
        );

        let ctx = RenderContext {
            models: &models,
            routes: &plan,
            config: &self.config,
        };
        let mut stage = OutputStage::new(&self.config.out_dir);
        let mut files = Vec::with_capacity(self.emitters.len());
        for emitter in &self.emitters {
            let target = emitter.target();
            let artifacts = emitter.render(&ctx)?;
            let paths: Vec<PathBuf> = artifacts.iter().map(|a| a.path.clone()).collect();
            for artifact in artifacts {
                if stage.get(&artifact.path).is_some() {
                    warn!(
                        "{:?} output {} replaces an earlier artifact",
                        target,
                        artifact.path.display()
                    );
                }
                stage.stage(artifact);
            }
            report.record(
                Stage::Render(target),
                StageOutcome::Done(format!("{} file(s)", paths.len())),
            );
            files.push((target, paths));
        }

        Ok(Rendered {
            stage,
            files,
            report,
        })
    }
}

/// Working directory for formatter processes
fn format_dir(root: &Path) -> PathBuf {
    if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root.to_path_buf()
    }
}
