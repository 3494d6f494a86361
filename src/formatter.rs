//! Best-effort code formatting of committed files.
//!
//! Each target supplies an ordered list of formatter invocations. They are
//! tried in turn until one succeeds; when none does, a [`FormatterWarning`] is
//! returned and logged. Formatting never fails a run.

use crate::config::Target;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A formatter program and its leading arguments; file paths are appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl FormatCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl fmt::Display for FormatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// No formatter could be run for a target's files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterWarning {
    pub target: Target,
    pub message: String,
}

impl fmt::Display for FormatterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.target, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The named command formatted the files
    Formatted { command: String },
    /// There was nothing to format
    NoFiles,
    Skipped(FormatterWarning),
}

pub struct Formatter;

impl Formatter {
    /// Run the first working command from `commands` over `files`.
    ///
    /// # Arguments
    ///
    /// * `target` - The target the files belong to, used in warnings
    /// * `commands` - Invocations to try, in order
    /// * `files` - Files to format
    /// * `cwd` - Working directory for the formatter process
    pub fn format(
        target: Target,
        commands: &[FormatCommand],
        files: &[PathBuf],
        cwd: &Path,
    ) -> FormatOutcome {
        if files.is_empty() {
            return FormatOutcome::NoFiles;
        }

        let mut attempts = Vec::with_capacity(commands.len());
        for command in commands {
            debug!("Running formatter: {} on {} file(s)", command, files.len());
            let output = Command::new(&command.program)
                .args(&command.args)
                .args(files)
                .current_dir(cwd)
                .output();

            match output {
                Ok(output) if output.status.success() => {
                    info!("Formatted {:?} output with `{}`", target, command);
                    return FormatOutcome::Formatted {
                        command: command.to_string(),
                    };
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    debug!("`{}` failed ({}): {}", command, output.status, stderr.trim());
                    attempts.push(format!("`{}` exited with {}", command, output.status));
                }
                Err(e) => {
                    debug!("`{}` could not be started: {}", command, e);
                    attempts.push(format!("`{}` is not available", command));
                }
            }
        }

        let message = if attempts.is_empty() {
            "no formatter configured; output left unformatted".to_string()
        } else {
            format!("{}; output left unformatted", attempts.join(", "))
        };
        let warning = FormatterWarning { target, message };
        warn!("Formatting skipped for {}", warning);
        FormatOutcome::Skipped(warning)
    }
}
