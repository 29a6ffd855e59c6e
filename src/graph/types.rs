//! Core types for the gouml type graph.
//!
//! Nodes are the named Go types found in the tree; edges are the
//! field-derived relations between them.

use std::fmt;
use std::path::PathBuf;

/// The kind of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A struct.
    Record,
    /// An interface.
    Contract,
    /// Any other named type. Kept only so references to it are
    /// recognized and skipped.
    Alias,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Record => write!(f, "class"),
            TypeKind::Contract => write!(f, "interface"),
            TypeKind::Alias => write!(f, "alias"),
        }
    }
}

/// Where a type was declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeIdentity {
    pub file_path: PathBuf,
    /// e.g. `github.com/acme/shop/models`
    pub package_path: String,
}

impl TypeIdentity {
    pub fn new(file_path: impl Into<PathBuf>, package_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            package_path: package_path.into(),
        }
    }
}

/// Data stored in a graph node.
#[derive(Debug, Clone)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub identity: TypeIdentity,
    pub name: String,
    /// Normalized method signatures, in the order they were found.
    pub method_signatures: Vec<String>,
    /// Rendered diagram block. Empty until the second pass reaches it.
    pub body: String,
}

impl TypeNode {
    pub fn new(kind: TypeKind, identity: TypeIdentity, name: String) -> Self {
        Self {
            kind,
            identity,
            name,
            method_signatures: Vec::new(),
            body: String::new(),
        }
    }

    pub fn package_path(&self) -> &str {
        &self.identity.package_path
    }

    /// Diagram-wide name, e.g. `github.com\\acme\\shop.Order`.
    pub fn unique_name(&self) -> String {
        format!("{}.{}", namespace_of(self.package_path()), self.name)
    }
}

/// PlantUML namespace for a package path: `/` becomes a literal `\\` and
/// `-` becomes `_`.
pub fn namespace_of(package_path: &str) -> String {
    package_path.replace('/', "\\\\").replace('-', "_")
}

/// Whether a reference is to one value or a collection of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    Single,
    Many,
}

/// The kind of a field-derived relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Unnamed (embedded) field.
    Embeds,
    /// Named field holding one value.
    HasOne,
    /// Named field holding a slice, array or map of values.
    HasMany,
}

impl RelationKind {
    pub fn for_field(embedded: bool, multiplicity: Multiplicity) -> Self {
        match (embedded, multiplicity) {
            (true, _) => RelationKind::Embeds,
            (false, Multiplicity::Single) => RelationKind::HasOne,
            (false, Multiplicity::Many) => RelationKind::HasMany,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Embeds => write!(f, "embeds"),
            RelationKind::HasOne => write!(f, "has_one"),
            RelationKind::HasMany => write!(f, "has_many"),
        }
    }
}

/// Data stored on a graph edge (source record -> target type).
#[derive(Debug, Clone)]
pub struct Relation {
    pub kind: RelationKind,
    /// Comma-joined field names; empty for embeds.
    pub field_names: String,
    /// The PlantUML line for this edge.
    pub rendered: String,
}

impl Relation {
    pub fn new(kind: RelationKind, field_names: String, source: &TypeNode, target: &TypeNode) -> Self {
        let source = source.unique_name();
        let target = target.unique_name();
        let rendered = match kind {
            RelationKind::Embeds => format!("{} <|- {}", target, source),
            RelationKind::HasOne => format!("{} ---> {} : {}", target, source, field_names),
            RelationKind::HasMany => {
                format!("{} ---> \"*\" {} : {}", target, source, field_names)
            }
        };
        Self {
            kind,
            field_names,
            rendered,
        }
    }
}
