use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for the generator
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the generator
#[derive(Debug, Error)]
pub enum Error {
    /// The schema document is malformed or structurally incomplete
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A `$ref` names a component that the document does not declare
    #[error("unresolved reference `{reference}` at {location}")]
    UnresolvedReference { reference: String, location: String },

    /// Two components map to the same emitted declaration name
    #[error("name collision: `{name}` is declared by both `{first}` and `{second}`")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// Two operations sharing a tag derive different router prefixes
    #[error(
        "prefix conflict for tag `{tag}`: `{path}` derives `{rejected}` but the group already uses `{kept}`"
    )]
    PrefixConflict {
        tag: String,
        kept: String,
        rejected: String,
        path: String,
    },

    /// Strict binding mode found operations with no service binding
    #[error("operations without a service binding: {}", .0.join(", "))]
    UnboundOperations(Vec<String>),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the staged output failed; previously committed files were restored
    #[error("failed to commit {}: {source}", path.display())]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::parse(err.to_string())
    }
}
