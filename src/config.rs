//! Analysis configuration.
//!
//! Loaded from an optional TOML file; command-line flags are layered on top
//! with [`ConfigOverrides::apply`].
//!
//! ```toml
//! source_root = "/go/src/example.com/shop"
//! library_root = "/go"
//! vendor_root = "/go/src/example.com/shop/vendor"
//! output = "shop.puml"
//! ignored_prefixes = ["/go/src/example.com/shop/internal/gen"]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{GoumlError, Result};

/// Default output path when neither the file nor the flags name one.
pub const DEFAULT_OUTPUT: &str = "uml.puml";

/// Everything the analysis core needs to know about a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Root of the Go tree to analyze.
    pub source_root: PathBuf,
    /// GOPATH-style root; packages live under `<library_root>/src`.
    pub library_root: PathBuf,
    /// Vendor directory probed before the library root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_root: Option<PathBuf>,
    /// Where the rendered diagram is written.
    pub output: PathBuf,
    /// Files whose path starts with any of these are skipped.
    pub ignored_prefixes: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            library_root: PathBuf::new(),
            vendor_root: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            ignored_prefixes: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| GoumlError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| GoumlError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the run's preconditions: both roots must be set and exist.
    pub fn validate(&self) -> Result<()> {
        if self.source_root.as_os_str().is_empty() {
            return Err(GoumlError::SourceRootUnset);
        }
        if !self.source_root.exists() {
            return Err(GoumlError::SourceRootMissing(self.source_root.clone()));
        }
        if self.library_root.as_os_str().is_empty() {
            return Err(GoumlError::LibraryRootUnset);
        }
        if !self.library_root.exists() {
            return Err(GoumlError::LibraryRootMissing(self.library_root.clone()));
        }
        Ok(())
    }

    /// `<library_root>/src`, the base that package paths are relative to.
    pub fn library_src(&self) -> PathBuf {
        self.library_root.join("src")
    }

    /// Whether `path` falls under one of the ignored prefixes. The prefix is
    /// compared against the full path and the path relative to the source root.
    pub fn is_ignored(&self, path: &Path) -> bool {
        if self.ignored_prefixes.is_empty() {
            return false;
        }
        let full = slash_path(path);
        let full = without_dot(&full);
        let relative = path
            .strip_prefix(&self.source_root)
            .ok()
            .map(slash_path);
        self.ignored_prefixes.iter().any(|prefix| {
            let prefix = prefix.replace('\\', "/");
            let prefix = without_dot(&prefix);
            full.starts_with(prefix)
                || relative.as_deref().is_some_and(|rel| rel.starts_with(prefix))
        })
    }
}

/// Values from the command line. `None` leaves the file value in place;
/// ignored prefixes are appended.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source_root: Option<PathBuf>,
    pub library_root: Option<PathBuf>,
    pub vendor_root: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub ignored_prefixes: Vec<String>,
}

impl ConfigOverrides {
    pub fn apply(self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(root) = self.source_root {
            config.source_root = root;
        }
        if let Some(root) = self.library_root {
            config.library_root = root;
        }
        if let Some(root) = self.vendor_root {
            config.vendor_root = Some(root);
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        config.ignored_prefixes.extend(self.ignored_prefixes);
        config
    }
}

/// A path rendered with forward slashes regardless of platform.
pub fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn without_dot(path: &str) -> &str {
    let mut path = path;
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config = AnalysisConfig::load(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gouml.toml");
        fs::write(
            &path,
            r#"
source_root = "/go/src/shop"
library_root = "/go"
ignored_prefixes = ["/go/src/shop/gen"]
"#,
        )
        .unwrap();

        let config = AnalysisConfig::load(&path).unwrap();
        assert_eq!(config.source_root, PathBuf::from("/go/src/shop"));
        assert_eq!(config.library_root, PathBuf::from("/go"));
        assert_eq!(config.vendor_root, None);
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.ignored_prefixes, vec!["/go/src/shop/gen".to_string()]);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gouml.toml");
        fs::write(&path, "source_root = [").unwrap();
        let err = AnalysisConfig::load(&path).unwrap_err();
        assert!(matches!(err, GoumlError::ConfigParse { .. }));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = AnalysisConfig {
            source_root: PathBuf::from("/from/file"),
            library_root: PathBuf::from("/lib"),
            ignored_prefixes: vec!["a".to_string()],
            ..AnalysisConfig::default()
        };
        let overrides = ConfigOverrides {
            source_root: Some(PathBuf::from("/from/flag")),
            output: Some(PathBuf::from("out.puml")),
            ignored_prefixes: vec!["b".to_string()],
            ..ConfigOverrides::default()
        };

        let config = overrides.apply(file);
        assert_eq!(config.source_root, PathBuf::from("/from/flag"));
        assert_eq!(config.library_root, PathBuf::from("/lib"));
        assert_eq!(config.output, PathBuf::from("out.puml"));
        assert_eq!(config.ignored_prefixes, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_validate_missing_roots() {
        let dir = tempfile::tempdir().unwrap();

        let unset = AnalysisConfig::default();
        assert!(matches!(unset.validate(), Err(GoumlError::SourceRootUnset)));

        let missing_source = AnalysisConfig {
            source_root: dir.path().join("nope"),
            library_root: dir.path().to_path_buf(),
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            missing_source.validate(),
            Err(GoumlError::SourceRootMissing(_))
        ));

        let missing_library = AnalysisConfig {
            source_root: dir.path().to_path_buf(),
            library_root: dir.path().join("nope"),
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            missing_library.validate(),
            Err(GoumlError::LibraryRootMissing(_))
        ));

        let ok = AnalysisConfig {
            source_root: dir.path().to_path_buf(),
            library_root: dir.path().to_path_buf(),
            ..AnalysisConfig::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_is_ignored_full_and_relative() {
        let config = AnalysisConfig {
            source_root: PathBuf::from("/go/src/shop"),
            ignored_prefixes: vec!["/go/src/shop/gen".to_string(), "mocks".to_string()],
            ..AnalysisConfig::default()
        };
        assert!(config.is_ignored(Path::new("/go/src/shop/gen/models.go")));
        assert!(config.is_ignored(Path::new("/go/src/shop/mocks/store.go")));
        assert!(!config.is_ignored(Path::new("/go/src/shop/api/server.go")));
    }

    #[test]
    fn test_to_toml_skips_unset_vendor_root() {
        let config = AnalysisConfig {
            source_root: PathBuf::from("/go/src/shop"),
            library_root: PathBuf::from("/go"),
            ..AnalysisConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert!(!text.contains("vendor_root"));
        assert_eq!(AnalysisConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_to_toml_round_trips_every_field() {
        let config = AnalysisConfig {
            source_root: PathBuf::from("/go/src/shop"),
            library_root: PathBuf::from("/go"),
            vendor_root: Some(PathBuf::from("/go/src/shop/vendor")),
            output: PathBuf::from("shop.puml"),
            ignored_prefixes: vec!["gen".to_string(), "/go/src/shop/mocks".to_string()],
        };
        let text = config.to_toml().unwrap();
        assert_eq!(AnalysisConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_serialize_error_is_reported() {
        let err = GoumlError::from(<toml::ser::Error as serde::ser::Error>::custom("bad value"));
        assert!(matches!(err, GoumlError::ConfigSerialize(_)));
        assert!(err.to_string().contains("bad value"));
    }

    #[test]
    fn test_is_ignored_accepts_dot_prefix() {
        let config = AnalysisConfig {
            ignored_prefixes: vec!["./app/gen".to_string()],
            ..AnalysisConfig::default()
        };
        assert!(config.is_ignored(Path::new("app/gen/gen.go")));
        assert!(config.is_ignored(Path::new("./app/gen/gen.go")));
        assert!(!config.is_ignored(Path::new("app/keep/keep.go")));
    }
}
