//! Import binding: which alias refers to which package path in one file.

use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::diagnostics::{DiagnosticKind, Diagnostics};
use crate::config::AnalysisConfig;
use crate::graph::TypeRegistry;
use crate::parser::{is_go_source, GoParser, ImportName, ImportSpec};

/// Alias carried by `import . "path"` bindings.
pub const DOT_ALIAS: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportBinding {
    pub alias: String,
    pub package_path: String,
}

impl ImportBinding {
    pub fn new(alias: impl Into<String>, package_path: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            package_path: package_path.into(),
        }
    }

    pub fn is_dot(&self) -> bool {
        self.alias == DOT_ALIAS
    }
}

/// Finds the package name of an import path by reading a Go file from its
/// directory under the vendor root, then under `<library_root>/src`.
pub struct PackageProbe {
    vendor_root: Option<PathBuf>,
    library_src: PathBuf,
    parser: GoParser,
    failed: HashSet<String>,
}

impl PackageProbe {
    pub fn new(config: &AnalysisConfig, parser: GoParser) -> Self {
        Self {
            vendor_root: config.vendor_root.clone(),
            library_src: config.library_src(),
            parser,
            failed: HashSet::new(),
        }
    }

    /// Probe for the package name. Failed paths are remembered and not
    /// probed again.
    pub fn probe(&mut self, package_path: &str) -> Option<String> {
        if self.failed.contains(package_path) {
            return None;
        }
        let roots: Vec<PathBuf> = self
            .vendor_root
            .iter()
            .chain(std::iter::once(&self.library_src))
            .cloned()
            .collect();
        for root in roots {
            let dir = package_path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .fold(root, |dir, segment| dir.join(segment));
            if let Some(name) = self.package_name_in(&dir) {
                debug!(package = package_path, name = %name, dir = %dir.display(), "probed package name");
                return Some(name);
            }
        }
        self.failed.insert(package_path.to_string());
        None
    }

    /// Whether `package_path` has already failed a probe.
    pub fn has_failed(&self, package_path: &str) -> bool {
        self.failed.contains(package_path)
    }

    fn package_name_in(&mut self, dir: &Path) -> Option<String> {
        let entries = fs::read_dir(dir).ok()?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_go_source(path))
            .collect();
        files.sort();
        files.into_iter().find_map(|file| {
            let source = fs::read_to_string(&file).ok()?;
            self.parser.package_name(&source)
        })
    }
}

/// Turns a file's import specs into bindings, filling the registry's
/// package name cache as new paths are probed.
pub struct ImportBinder<'a> {
    registry: &'a mut TypeRegistry,
    probe: &'a mut PackageProbe,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> ImportBinder<'a> {
    pub fn new(
        registry: &'a mut TypeRegistry,
        probe: &'a mut PackageProbe,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            registry,
            probe,
            diagnostics,
        }
    }

    /// Bindings in declaration order. An import whose package name cannot
    /// be determined yields no binding and a diagnostic.
    pub fn bind(&mut self, file: &Path, specs: &[ImportSpec]) -> Vec<ImportBinding> {
        specs
            .iter()
            .filter_map(|spec| self.bind_one(file, spec))
            .collect()
    }

    fn bind_one(&mut self, file: &Path, spec: &ImportSpec) -> Option<ImportBinding> {
        let alias = match &spec.name {
            ImportName::Alias(alias) => alias.clone(),
            ImportName::Dot => DOT_ALIAS.to_string(),
            ImportName::Default => self.package_name(file, &spec.path)?,
        };
        Some(ImportBinding::new(alias, spec.path.clone()))
    }

    fn package_name(&mut self, file: &Path, package_path: &str) -> Option<String> {
        if let Some(name) = self.registry.package_name_for(package_path) {
            return Some(name.to_string());
        }
        let already_failed = self.probe.has_failed(package_path);
        match self.probe.probe(package_path) {
            Some(name) => {
                self.registry.map_package_name(package_path, &name);
                Some(name)
            }
            None => {
                if !already_failed {
                    self.diagnostics.report(
                        DiagnosticKind::PackageNameProbe,
                        Some(file),
                        format!("cannot determine package name of import {:?}", package_path),
                    );
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: ImportName, path: &str) -> ImportSpec {
        ImportSpec {
            name,
            path: path.to_string(),
        }
    }

    fn probe_for(library_root: &Path, vendor_root: Option<&Path>) -> PackageProbe {
        let config = AnalysisConfig {
            library_root: library_root.to_path_buf(),
            vendor_root: vendor_root.map(Path::to_path_buf),
            ..AnalysisConfig::default()
        };
        PackageProbe::new(&config, GoParser::new().unwrap())
    }

    #[test]
    fn test_explicit_and_cached_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = TypeRegistry::new();
        registry.map_package_name("net/http", "http");
        let mut probe = probe_for(dir.path(), None);
        let mut diagnostics = Diagnostics::new();

        let bindings = ImportBinder::new(&mut registry, &mut probe, &mut diagnostics).bind(
            Path::new("a.go"),
            &[
                spec(ImportName::Default, "net/http"),
                spec(ImportName::Alias("h".into()), "net/http"),
                spec(ImportName::Dot, "example.com/models"),
                spec(ImportName::Alias("_".into()), "embed"),
            ],
        );
        assert_eq!(
            bindings,
            vec![
                ImportBinding::new("http", "net/http"),
                ImportBinding::new("h", "net/http"),
                ImportBinding::new(".", "example.com/models"),
                ImportBinding::new("_", "embed"),
            ]
        );
        assert!(bindings[2].is_dot());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_probe_prefers_vendor_and_skips_tests() {
        let dir = tempfile::tempdir().unwrap();
        let library = dir.path().join("gopath");
        let vendor = dir.path().join("vendor");

        let lib_pkg = library.join("src/github.com/acme/go-kit");
        fs::create_dir_all(&lib_pkg).unwrap();
        fs::write(lib_pkg.join("kit.go"), "package fromlib\n").unwrap();

        let vendor_pkg = vendor.join("github.com/acme/go-kit");
        fs::create_dir_all(&vendor_pkg).unwrap();
        fs::write(vendor_pkg.join("a_test.go"), "package kit_test\n").unwrap();
        fs::write(vendor_pkg.join("b.go"), "package kit\n").unwrap();

        let mut probe = probe_for(&library, Some(&vendor));
        assert_eq!(probe.probe("github.com/acme/go-kit"), Some("kit".to_string()));

        let mut probe = probe_for(&library, None);
        assert_eq!(
            probe.probe("github.com/acme/go-kit"),
            Some("fromlib".to_string())
        );
    }

    #[test]
    fn test_probe_result_is_cached_in_registry() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("src/example.com/util");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("util.go"), "package helpers\n").unwrap();

        let mut registry = TypeRegistry::new();
        let mut probe = probe_for(dir.path(), None);
        let mut diagnostics = Diagnostics::new();
        let bindings = ImportBinder::new(&mut registry, &mut probe, &mut diagnostics)
            .bind(Path::new("a.go"), &[spec(ImportName::Default, "example.com/util")]);

        assert_eq!(bindings, vec![ImportBinding::new("helpers", "example.com/util")]);
        assert_eq!(registry.package_name_for("example.com/util"), Some("helpers"));
    }

    #[test]
    fn test_probe_failure_reports_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = TypeRegistry::new();
        let mut probe = probe_for(dir.path(), None);
        let mut diagnostics = Diagnostics::new();
        let imports = [spec(ImportName::Default, "example.com/missing")];

        for file in ["a.go", "b.go"] {
            let bindings = ImportBinder::new(&mut registry, &mut probe, &mut diagnostics)
                .bind(Path::new(file), &imports);
            assert!(bindings.is_empty());
        }
        assert_eq!(diagnostics.of_kind(DiagnosticKind::PackageNameProbe).count(), 1);
    }
}
