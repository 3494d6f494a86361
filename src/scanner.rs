use crate::error::{Error, Result};
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Scanner for schema documents inside a directory tree.
///
/// The `SchemaScanner` recursively walks a directory and collects every
/// `.yaml`, `.yml` and `.json` file. Hidden directories (those starting with
/// `.`), `target` and `node_modules` are skipped. Results are sorted by path so
/// that merging the documents is deterministic.
///
/// # Example
///
/// ```no_run
/// use openapi_scaffold::scanner::SchemaScanner;
/// use std::path::PathBuf;
///
/// let scanner = SchemaScanner::new(PathBuf::from("./source"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} schema documents", result.schema_files.len());
/// ```
pub struct SchemaScanner {
    root_path: PathBuf,
}

/// Result of a directory scan.
pub struct ScanResult {
    /// Schema documents found, sorted by path
    pub schema_files: Vec<PathBuf>,
    /// Warning messages for entries that could not be read
    pub warnings: Vec<String>,
}

const SCHEMA_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];
const SKIPPED_DIRS: [&str; 2] = ["target", "node_modules"];

impl SchemaScanner {
    /// Creates a new `SchemaScanner` for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects schema documents.
    ///
    /// Entries that cannot be accessed are logged and reported in
    /// [`ScanResult::warnings`]; scanning continues past them.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a readable directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            return Err(Error::Config(format!(
                "schema directory does not exist: {}",
                self.root_path.display()
            )));
        }

        let mut schema_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && !SKIPPED_DIRS.contains(&file_name.as_ref())
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    let is_schema = path
                        .extension()
                        .and_then(|s| s.to_str())
                        .is_some_and(|ext| SCHEMA_EXTENSIONS.contains(&ext));
                    if path.is_file() && is_schema {
                        schema_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        schema_files.sort();
        debug!(
            "Found {} schema documents under {}",
            schema_files.len(),
            self.root_path.display()
        );

        Ok(ScanResult {
            schema_files,
            warnings,
        })
    }
}
