//! Graph builder: walks the source tree and fills the type registry.
//!
//! The tree is visited twice. [`Analyzer::collect_declarations`] registers
//! every named type so that pass two can resolve references to types
//! declared in files it has not reached yet. [`Declarations::resolve_relations`]
//! then renders bodies, records method signatures and adds relations.

use ignore::WalkBuilder;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use super::registry::{RegistryStats, TypeId, TypeRegistry};
use super::types::{RelationKind, TypeIdentity, TypeKind};
use crate::analysis::{
    method_signature, seed_std_packages, DiagnosticKind, Diagnostics, FileScope, ImportBinder,
    PackageProbe, TypeResolver,
};
use crate::config::AnalysisConfig;
use crate::diagram;
use crate::error::Result;
use crate::parser::{
    is_go_source, FieldDecl, GoParser, InterfaceMethod, MethodDecl, SourceFile, TypeDef,
};

/// Run both passes and return the finished analysis.
pub fn analyze(config: AnalysisConfig) -> Result<Analysis> {
    Ok(Analyzer::new(config)?
        .collect_declarations()
        .resolve_relations())
}

/// Package path of the directory holding `file`: relative to the vendor
/// root, else to `<library_root>/src`, else to the parent of the source
/// root. Segments are always joined with `/`.
pub fn package_path_of(config: &AnalysisConfig, file: &Path) -> Option<String> {
    let dir = file.parent()?;
    let bases = config
        .vendor_root
        .iter()
        .cloned()
        .chain(std::iter::once(config.library_src()))
        .chain(config.source_root.parent().map(Path::to_path_buf));
    for base in bases {
        let Ok(relative) = dir.strip_prefix(&base) else {
            continue;
        };
        let segments: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if !segments.is_empty() {
            return Some(segments.join("/"));
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Declarations,
    Relations,
}

/// State shared by both passes.
struct Session {
    config: AnalysisConfig,
    /// The source root as configured, before canonicalization.
    given_source_root: PathBuf,
    registry: TypeRegistry,
    diagnostics: Diagnostics,
    parser: GoParser,
    probe: PackageProbe,
    files: usize,
}

/// Entry point. Validates the configuration and seeds the package name cache.
pub struct Analyzer {
    session: Session,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let given_source_root = config.source_root.clone();
        let config = canonical_roots(config)?;

        let mut registry = TypeRegistry::new();
        let seeded = seed_std_packages(&mut registry);
        debug!(seeded, "seeded standard library package names");

        let probe = PackageProbe::new(&config, GoParser::new()?);
        Ok(Self {
            session: Session {
                config,
                given_source_root,
                registry,
                diagnostics: Diagnostics::new(),
                parser: GoParser::new()?,
                probe,
                files: 0,
            },
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.session.config
    }

    /// Pass one: register every struct, interface and other named type.
    pub fn collect_declarations(mut self) -> Declarations {
        let files = self.session.source_files();
        info!(
            root = %self.session.config.source_root.display(),
            files = files.len(),
            "collecting declarations"
        );
        for path in &files {
            self.session.declare_file(path);
        }
        self.session.files = files.len();
        Declarations {
            session: self.session,
        }
    }
}

/// Every type is registered; nothing is resolved yet.
pub struct Declarations {
    session: Session,
}

impl Declarations {
    pub fn registry(&self) -> &TypeRegistry {
        &self.session.registry
    }

    /// Pass two: bind imports, render bodies, collect method signatures
    /// and add field relations.
    pub fn resolve_relations(mut self) -> Analysis {
        let files = self.session.source_files();
        info!(files = files.len(), "resolving relations");
        for path in &files {
            self.session.relate_file(path);
        }

        let session = self.session;
        let analysis = Analysis {
            config: session.config,
            registry: session.registry,
            diagnostics: session.diagnostics,
            files: session.files,
        };
        let stats = analysis.stats();
        info!(
            files = stats.files,
            records = stats.types.records,
            contracts = stats.types.contracts,
            aliases = stats.types.aliases,
            relations = stats.types.relations,
            diagnostics = stats.diagnostics,
            "analysis complete"
        );
        analysis
    }
}

/// The finished run.
pub struct Analysis {
    config: AnalysisConfig,
    registry: TypeRegistry,
    diagnostics: Diagnostics,
    files: usize,
}

impl Analysis {
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The PlantUML document.
    pub fn render(&self) -> String {
        diagram::render_plantuml(&self.registry)
    }

    pub fn stats(&self) -> AnalysisStats {
        AnalysisStats {
            files: self.files,
            types: self.registry.stats(),
            diagnostics: self.diagnostics.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisStats {
    pub files: usize,
    pub types: RegistryStats,
    pub diagnostics: usize,
}

impl std::fmt::Display for AnalysisStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Analyzed {} files: {} classes, {} interfaces, {} named types, {} relations, {} diagnostics",
            self.files,
            self.types.records,
            self.types.contracts,
            self.types.aliases,
            self.types.relations,
            self.diagnostics
        )
    }
}

fn canonical_roots(mut config: AnalysisConfig) -> Result<AnalysisConfig> {
    config.source_root = config.source_root.canonicalize()?;
    config.library_root = config.library_root.canonicalize()?;
    if let Some(vendor) = config.vendor_root.take() {
        config.vendor_root = Some(vendor.canonicalize().unwrap_or(vendor));
    }
    Ok(config)
}

impl Session {
    /// Eligible files under the source root, depth first, sorted by name.
    fn source_files(&self) -> Vec<PathBuf> {
        WalkBuilder::new(&self.config.source_root)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| is_go_source(path))
            .filter(|path| {
                let ignored = self.is_ignored(path);
                if ignored {
                    debug!(file = %path.display(), "ignored");
                }
                !ignored
            })
            .collect()
    }

    /// Ignored prefixes are matched against the walked path and against the
    /// same path spelled under the source root as configured.
    fn is_ignored(&self, path: &Path) -> bool {
        if self.config.is_ignored(path) {
            return true;
        }
        let Ok(relative) = path.strip_prefix(&self.config.source_root) else {
            return false;
        };
        self.config.is_ignored(&self.given_source_root.join(relative))
    }

    /// Read, parse and place one file. Failures are reported during the
    /// first pass only.
    fn load(&mut self, path: &Path, pass: Pass) -> Option<(String, SourceFile)> {
        let report = pass == Pass::Declarations;
        info!(?pass, file = %path.display(), "parsing");

        let Some(package_path) = package_path_of(&self.config, path) else {
            if report {
                self.diagnostics.report(
                    DiagnosticKind::UnknownPackagePath,
                    Some(path),
                    "file is outside the vendor, library and source roots",
                );
            }
            return None;
        };

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                if report {
                    self.diagnostics.report(
                        DiagnosticKind::ParseFailure,
                        Some(path),
                        format!("cannot read file: {}", err),
                    );
                }
                return None;
            }
        };

        match self.parser.parse(path, &source) {
            Ok(file) => {
                if let (Some(err), true) = (file.syntax_error, report) {
                    self.diagnostics.report(
                        DiagnosticKind::ParseFailure,
                        Some(path),
                        format!("{}, later declarations skipped", err),
                    );
                }
                Some((package_path, file))
            }
            Err(err) => {
                if report {
                    self.diagnostics
                        .report(DiagnosticKind::ParseFailure, Some(path), err.to_string());
                }
                None
            }
        }
    }

    fn declare_file(&mut self, path: &Path) {
        let Some((package_path, file)) = self.load(path, Pass::Declarations) else {
            return;
        };
        self.registry
            .map_package_name(&package_path, &file.package_name);
        for decl in &file.types {
            let kind = match decl.def {
                TypeDef::Record(_) => TypeKind::Record,
                TypeDef::Contract(_) => TypeKind::Contract,
                TypeDef::Alias(_) => TypeKind::Alias,
            };
            self.registry.register_type(
                kind,
                TypeIdentity::new(path, package_path.as_str()),
                &decl.name,
            );
        }
    }

    fn relate_file(&mut self, path: &Path) {
        let Some((package_path, file)) = self.load(path, Pass::Relations) else {
            return;
        };
        let imports = ImportBinder::new(&mut self.registry, &mut self.probe, &mut self.diagnostics)
            .bind(path, &file.imports);
        let scope = FileScope {
            file: path,
            package_path: &package_path,
            imports: &imports,
        };

        for decl in &file.types {
            match &decl.def {
                TypeDef::Contract(methods) => self.relate_contract(scope, &decl.name, methods),
                TypeDef::Record(fields) => self.relate_record(scope, &decl.name, fields),
                TypeDef::Alias(_) => {}
            }
        }
        for method in &file.methods {
            self.attach_method(scope, method);
        }
    }

    fn registered(&mut self, kind: TypeKind, scope: FileScope<'_>, name: &str) -> Option<TypeId> {
        let found = self.registry.find(kind, scope.package_path, name);
        if found.is_none() {
            self.diagnostics.report(
                DiagnosticKind::MissingDeclaration,
                Some(scope.file),
                format!("{} {}.{} was not registered", kind, scope.package_path, name),
            );
        }
        found
    }

    fn relate_contract(&mut self, scope: FileScope<'_>, name: &str, methods: &[InterfaceMethod]) {
        let Some(id) = self.registered(TypeKind::Contract, scope, name) else {
            return;
        };
        let mut resolver = TypeResolver::new(&self.registry, scope, &mut self.diagnostics);
        let signatures: Vec<String> = methods
            .iter()
            .map(|method| method_signature(&method.name, &method.signature, &mut resolver))
            .collect();

        let node = self.registry.get_mut(id);
        node.method_signatures = signatures;
        node.body = diagram::contract_body(scope.package_path, name, methods);
    }

    fn relate_record(&mut self, scope: FileScope<'_>, name: &str, fields: &[FieldDecl]) {
        let Some(id) = self.registered(TypeKind::Record, scope, name) else {
            return;
        };
        let mut resolver = TypeResolver::new(&self.registry, scope, &mut self.diagnostics);
        let relations: Vec<(TypeId, RelationKind, String)> = fields
            .iter()
            .filter_map(|field| {
                let resolved = resolver.resolve(&field.ty)?;
                let kind = RelationKind::for_field(field.is_embedded(), resolved.multiplicity);
                Some((resolved.target, kind, field.names.join(",")))
            })
            .collect();

        self.registry.get_mut(id).body = diagram::record_body(scope.package_path, name, fields);
        for (target, kind, field_names) in relations {
            self.registry.add_relation(id, target, kind, field_names);
        }
    }

    /// Methods count toward a record only when the receiver is `T` or `*T`
    /// for a record `T` of the same package.
    fn attach_method(&mut self, scope: FileScope<'_>, method: &MethodDecl) {
        let Some(receiver) = method.receiver_type_name() else {
            return;
        };
        let Some(id) = self
            .registry
            .find(TypeKind::Record, scope.package_path, receiver)
        else {
            debug!(receiver, method = %method.name, "receiver is not a struct, skipping");
            return;
        };
        let mut resolver = TypeResolver::new(&self.registry, scope, &mut self.diagnostics);
        let signature = method_signature(&method.name, &method.signature, &mut resolver);
        self.registry.get_mut(id).method_signatures.push(signature);
    }
}
