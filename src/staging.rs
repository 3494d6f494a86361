//! In-memory output staging with all-or-nothing commit.
//!
//! Every generated file is rendered into an [`OutputStage`] first. Nothing
//! touches the output directory until [`OutputStage::commit`], which writes
//! each artifact to a temporary file next to its destination and only then
//! renames the temporaries into place. A failed rename restores the files that
//! were already replaced.

use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, PersistError};

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Destination, relative to the stage root
    pub path: PathBuf,
    pub contents: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Artifacts waiting to be written under a common root directory
#[derive(Debug, Clone)]
pub struct OutputStage {
    root: PathBuf,
    artifacts: Vec<Artifact>,
}

/// A destination whose temporary file has been written
struct Pending {
    destination: PathBuf,
    temp: NamedTempFile,
    previous: Option<Vec<u8>>,
}

impl OutputStage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            artifacts: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add an artifact, replacing any earlier artifact with the same path
    pub fn stage(&mut self, artifact: Artifact) {
        match self.artifacts.iter_mut().find(|a| a.path == artifact.path) {
            Some(existing) => {
                debug!("Replacing staged artifact {}", artifact.path.display());
                *existing = artifact;
            }
            None => self.artifacts.push(artifact),
        }
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn get(&self, path: &Path) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.path == path)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Absolute destination of a staged path
    pub fn destination(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Write every staged artifact to disk.
    ///
    /// # Returns
    ///
    /// The destination paths in staging order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Commit`] naming the file that could not be written.
    /// Files already replaced are restored to their previous contents, or
    /// removed if they did not exist, and directories created by the commit
    /// are removed again.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        let mut pending = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let destination = self.destination(&artifact.path);
            let written = create_parents(&destination, &mut created)
                .and_then(|parent| write_temp(&parent, &artifact.contents));
            let temp = match written {
                Ok(temp) => temp,
                Err(source) => {
                    drop(pending);
                    remove_created(&created);
                    return Err(Error::Commit {
                        path: destination,
                        source,
                    });
                }
            };
            let previous = if destination.is_file() {
                fs::read(&destination).ok()
            } else {
                None
            };
            pending.push(Pending {
                destination,
                temp,
                previous,
            });
        }

        let mut replaced: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::with_capacity(pending.len());
        let mut remaining = pending.into_iter();
        while let Some(Pending {
            destination,
            temp,
            previous,
        }) = remaining.next()
        {
            if let Err(PersistError { error, file }) = temp.persist(&destination) {
                warn!(
                    "Failed to move output into {}; rolling back {} file(s)",
                    destination.display(),
                    replaced.len()
                );
                drop(file);
                drop(remaining);
                rollback(replaced);
                remove_created(&created);
                return Err(Error::Commit {
                    path: destination,
                    source: error,
                });
            }
            debug!("Wrote {}", destination.display());
            replaced.push((destination, previous));
        }

        info!("Committed {} generated file(s)", replaced.len());
        Ok(replaced.into_iter().map(|(path, _)| path).collect())
    }
}

/// Creates the missing ancestors of `destination`, outermost first, and
/// records each directory it created in `created`.
fn create_parents(destination: &Path, created: &mut Vec<PathBuf>) -> std::io::Result<PathBuf> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let missing: Vec<&Path> = parent
        .ancestors()
        .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
        .collect();
    for dir in missing.into_iter().rev() {
        match fs::create_dir(dir) {
            Ok(()) => created.push(dir.to_path_buf()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }
    }
    Ok(parent)
}

fn write_temp(parent: &Path, contents: &str) -> std::io::Result<NamedTempFile> {
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    Ok(temp)
}

fn rollback(replaced: Vec<(PathBuf, Option<Vec<u8>>)>) {
    for (path, previous) in replaced.into_iter().rev() {
        let result = match previous {
            Some(bytes) => fs::write(&path, bytes),
            None => fs::remove_file(&path),
        };
        if let Err(e) = result {
            warn!("Failed to restore {}: {}", path.display(), e);
        }
    }
}

/// Innermost first
fn remove_created(created: &[PathBuf]) {
    for dir in created.iter().rev() {
        if let Err(e) = fs::remove_dir(dir) {
            warn!("Failed to remove {}: {}", dir.display(), e);
        }
    }
}
