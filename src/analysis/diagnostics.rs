//! Non-fatal findings collected during a run.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A file could not be read or parsed, fully or partially.
    ParseFailure,
    /// A type reference whose package could not be determined.
    UnresolvedReference,
    /// No package name could be sniffed from an imported directory.
    PackageNameProbe,
    /// A file lies outside every root a package path can be derived from.
    UnknownPackagePath,
    /// The second pass met a declaration the first pass never registered.
    MissingDeclaration,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::ParseFailure => write!(f, "parse failure"),
            DiagnosticKind::UnresolvedReference => write!(f, "unresolved reference"),
            DiagnosticKind::PackageNameProbe => write!(f, "package name probe"),
            DiagnosticKind::UnknownPackagePath => write!(f, "unknown package path"),
            DiagnosticKind::MissingDeclaration => write!(f, "missing declaration"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}: {} ({})", self.kind, self.message, file.display()),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Append-only list of diagnostics. Every entry is also logged at warn level.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, kind: DiagnosticKind, file: Option<&Path>, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            kind,
            file: file.map(Path::to_path_buf),
            message: message.into(),
        };
        warn!(%kind, file = ?diagnostic.file, "{}", diagnostic.message);
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}
