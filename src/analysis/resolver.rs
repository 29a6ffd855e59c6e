//! Type reference resolution.
//!
//! Maps a type expression seen in one file to a registered record or
//! contract, and decides which package an alias refers to.

use std::path::Path;

use super::diagnostics::{DiagnosticKind, Diagnostics};
use super::imports::ImportBinding;
use super::signature::TypeNamer;
use crate::graph::{Multiplicity, TypeId, TypeRegistry};
use crate::parser::TypeExpr;

/// Predeclared names that never refer to a user type.
const BASE_TYPES: &[&str] = &[
    "bool", "byte", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32",
    "uint64", "float32", "float64", "complex64", "complex128", "string", "uintptr", "rune",
    "error", "any",
];

pub fn is_base_type(name: &str) -> bool {
    BASE_TYPES.contains(&name)
}

/// The file a reference appears in.
#[derive(Debug, Clone, Copy)]
pub struct FileScope<'a> {
    pub file: &'a Path,
    pub package_path: &'a str,
    pub imports: &'a [ImportBinding],
}

impl<'a> FileScope<'a> {
    fn dot_imports(&self) -> impl Iterator<Item = &'a ImportBinding> {
        self.imports.iter().filter(|binding| binding.is_dot())
    }
}

/// Outcome of [`TypeResolver::resolve_package`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageLookup {
    /// The name refers to a record or contract in this package, or the
    /// alias is bound to it.
    Found(String),
    /// The name is a non-struct, non-interface type in this package.
    /// References to it produce no relation.
    Alias(String),
    /// Nothing matched. `best_effort` is the alias as written, which may
    /// still be a package path.
    Unresolved { best_effort: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedType {
    pub target: TypeId,
    pub multiplicity: Multiplicity,
}

impl ResolvedType {
    fn many(self) -> Self {
        Self {
            multiplicity: Multiplicity::Many,
            ..self
        }
    }
}

pub struct TypeResolver<'a> {
    registry: &'a TypeRegistry,
    scope: FileScope<'a>,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> TypeResolver<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        scope: FileScope<'a>,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            registry,
            scope,
            diagnostics,
        }
    }

    /// The record or contract a field type refers to, and whether the field
    /// holds one or many of it. Pointers are transparent; slices, arrays
    /// and map values make the reference plural. Function, channel and
    /// inline types refer to nothing.
    pub fn resolve(&mut self, expr: &TypeExpr) -> Option<ResolvedType> {
        match expr {
            TypeExpr::Named(name) => {
                if is_base_type(name) {
                    return None;
                }
                self.lookup("", name).map(single)
            }
            TypeExpr::Qualified { package, name } => self.lookup(package, name).map(single),
            TypeExpr::Pointer(inner) => self.resolve(inner),
            TypeExpr::Array { elem, .. } => self.resolve(elem).map(ResolvedType::many),
            TypeExpr::Map { value, .. } => self.resolve(value).map(ResolvedType::many),
            TypeExpr::Func(_)
            | TypeExpr::Channel { .. }
            | TypeExpr::InlineContract(_)
            | TypeExpr::InlineRecord(_)
            | TypeExpr::Ellipsis(_)
            | TypeExpr::Parenthesized(_) => None,
        }
    }

    fn lookup(&mut self, alias: &str, name: &str) -> Option<TypeId> {
        match self.resolve_package(alias, name) {
            PackageLookup::Found(path) => self.registry.find_record_or_contract(&path, name),
            PackageLookup::Alias(_) => None,
            PackageLookup::Unresolved { best_effort } if !best_effort.is_empty() => {
                self.registry.find_record_or_contract(&best_effort, name)
            }
            PackageLookup::Unresolved { .. } => None,
        }
    }

    /// Decide which package `alias.name` (or bare `name` when `alias` is
    /// empty) refers to.
    ///
    /// A bare name is looked up in the current package, then in every
    /// dot-imported package. A qualified name first matches an import whose
    /// path is literally the alias, then bindings with that alias; when
    /// several bindings share the alias, the one whose package declares
    /// `name` wins.
    pub fn resolve_package(&mut self, alias: &str, name: &str) -> PackageLookup {
        let scope = self.scope;
        if alias.is_empty() {
            let current = std::iter::once(scope.package_path);
            let dot = scope.dot_imports().map(|binding| binding.package_path.as_str());
            if let Some(hit) = self.probe_packages(current.chain(dot), name) {
                return hit;
            }
            return self.unresolved(alias, name, scope.dot_imports().count());
        }

        if scope.imports.iter().any(|binding| binding.package_path == alias) {
            return PackageLookup::Found(alias.to_string());
        }

        let matched: Vec<&ImportBinding> = scope
            .imports
            .iter()
            .filter(|binding| binding.alias == alias)
            .collect();
        match matched.as_slice() {
            [only] => PackageLookup::Found(only.package_path.clone()),
            [] => self.unresolved(alias, name, 0),
            several => {
                let paths = several.iter().map(|binding| binding.package_path.as_str());
                match self.probe_packages(paths, name) {
                    Some(hit) => hit,
                    None => self.unresolved(alias, name, several.len()),
                }
            }
        }
    }

    /// First package, in order, that declares `name`.
    fn probe_packages<'p>(
        &self,
        packages: impl Iterator<Item = &'p str>,
        name: &str,
    ) -> Option<PackageLookup> {
        for package in packages {
            if self.registry.find_record_or_contract(package, name).is_some() {
                return Some(PackageLookup::Found(package.to_string()));
            }
            if self.registry.has_alias(package, name) {
                return Some(PackageLookup::Alias(package.to_string()));
            }
        }
        None
    }

    fn unresolved(&mut self, alias: &str, name: &str, candidates: usize) -> PackageLookup {
        let imports = serde_json::to_string(self.scope.imports).unwrap_or_default();
        self.diagnostics.report(
            DiagnosticKind::UnresolvedReference,
            Some(self.scope.file),
            format!(
                "cannot find package for {:?} of type {:?}, {} candidate imports, imports={}",
                alias, name, candidates, imports
            ),
        );
        PackageLookup::Unresolved {
            best_effort: alias.to_string(),
        }
    }
}

fn single(target: TypeId) -> ResolvedType {
    ResolvedType {
        target,
        multiplicity: Multiplicity::Single,
    }
}

/// Signature spelling: names declared in the current package or a
/// dot-imported one are prefixed with their package path, qualified names
/// use the package they resolve to.
impl TypeNamer for TypeResolver<'_> {
    fn named(&mut self, name: &str) -> String {
        if is_base_type(name) {
            return name.to_string();
        }
        let scope = self.scope;
        let declared = std::iter::once(scope.package_path)
            .chain(scope.dot_imports().map(|binding| binding.package_path.as_str()))
            .find(|package| {
                self.registry.find_record_or_contract(package, name).is_some()
                    || self.registry.has_alias(package, name)
            });
        match declared {
            Some(package) => format!("{}.{}", package, name),
            None => name.to_string(),
        }
    }

    fn qualified(&mut self, package: &str, name: &str) -> String {
        match self.resolve_package(package, name) {
            PackageLookup::Found(path) | PackageLookup::Alias(path) => format!("{}.{}", path, name),
            PackageLookup::Unresolved { best_effort } => format!("{}.{}", best_effort, name),
        }
    }
}
