//! Error types for gouml.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Anything recoverable during a run is a
/// [`Diagnostic`](crate::analysis::Diagnostic) instead.
#[derive(Debug, Error)]
pub enum GoumlError {
    #[error("cannot find source root {0}")]
    SourceRootMissing(PathBuf),

    #[error("cannot find library root {0}")]
    LibraryRootMissing(PathBuf),

    #[error("source root is not configured")]
    SourceRootUnset,

    #[error("library root is not configured (pass --library-root or set GOPATH)")]
    LibraryRootUnset,

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot render config as TOML: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("failed to load Go grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GoumlError>;
