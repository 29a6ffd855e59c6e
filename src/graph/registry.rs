//! The type registry.
//!
//! Uses petgraph to store types and the relations between them, with an
//! index for `(kind, package path, name)` lookups. Node and edge indices
//! follow insertion order, which is also the diagram's output order.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::debug;

use super::types::*;

/// Handle to a registered type.
pub type TypeId = NodeIndex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TypeKey {
    kind: TypeKind,
    package_path: String,
    name: String,
}

impl TypeKey {
    fn new(kind: TypeKind, package_path: &str, name: &str) -> Self {
        Self {
            kind,
            package_path: package_path.to_string(),
            name: name.to_string(),
        }
    }
}

/// All discovered types, their relations, and the package name cache.
pub struct TypeRegistry {
    graph: DiGraph<TypeNode, Relation>,
    /// Index: (kind, package path, name) -> node.
    index: HashMap<TypeKey, TypeId>,
    /// Package path -> package name. First write wins.
    package_names: HashMap<String, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            package_names: HashMap::new(),
        }
    }

    // ─── Types ──────────────────────────────────────────────────

    /// Register a type unless one with the same kind, package and name exists.
    /// Returns the handle of the registered (or existing) entry.
    pub fn register_type(&mut self, kind: TypeKind, identity: TypeIdentity, name: &str) -> TypeId {
        let key = TypeKey::new(kind, &identity.package_path, name);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        debug!(%kind, package = %identity.package_path, type_name = name, "registering type");
        let id = self
            .graph
            .add_node(TypeNode::new(kind, identity, name.to_string()));
        self.index.insert(key, id);
        id
    }

    pub fn find(&self, kind: TypeKind, package_path: &str, name: &str) -> Option<TypeId> {
        self.index
            .get(&TypeKey::new(kind, package_path, name))
            .copied()
    }

    /// A record named `name` in the package, else a contract.
    pub fn find_record_or_contract(&self, package_path: &str, name: &str) -> Option<TypeId> {
        self.find(TypeKind::Record, package_path, name)
            .or_else(|| self.find(TypeKind::Contract, package_path, name))
    }

    pub fn has_alias(&self, package_path: &str, name: &str) -> bool {
        self.find(TypeKind::Alias, package_path, name).is_some()
    }

    pub fn get(&self, id: TypeId) -> &TypeNode {
        &self.graph[id]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeNode {
        &mut self.graph[id]
    }

    /// All types of one kind, in registration order.
    pub fn types_of(&self, kind: TypeKind) -> impl Iterator<Item = (TypeId, &TypeNode)> + '_ {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
            .filter(move |(_, node)| node.kind == kind)
    }

    pub fn records(&self) -> impl Iterator<Item = (TypeId, &TypeNode)> + '_ {
        self.types_of(TypeKind::Record)
    }

    pub fn contracts(&self) -> impl Iterator<Item = (TypeId, &TypeNode)> + '_ {
        self.types_of(TypeKind::Contract)
    }

    // ─── Relations ──────────────────────────────────────────────

    /// Append a relation from a record to the type one of its fields refers to.
    pub fn add_relation(
        &mut self,
        source: TypeId,
        target: TypeId,
        kind: RelationKind,
        field_names: String,
    ) {
        let relation = Relation::new(kind, field_names, &self.graph[source], &self.graph[target]);
        debug!(edge = %relation.rendered, "adding relation");
        self.graph.add_edge(source, target, relation);
    }

    /// All relations as (source, target, relation), in insertion order.
    pub fn relations(&self) -> impl Iterator<Item = (&TypeNode, &TypeNode, &Relation)> + '_ {
        self.graph.edge_references().map(move |edge| {
            (
                &self.graph[edge.source()],
                &self.graph[edge.target()],
                edge.weight(),
            )
        })
    }

    // ─── Package names ──────────────────────────────────────────

    /// Remember the name of a package. Empty inputs are ignored and an
    /// existing mapping is never overwritten. Returns whether it was stored.
    pub fn map_package_name(&mut self, package_path: &str, package_name: &str) -> bool {
        if package_path.is_empty() || package_name.is_empty() {
            return false;
        }
        if self.package_names.contains_key(package_path) {
            return false;
        }
        self.package_names
            .insert(package_path.to_string(), package_name.to_string());
        true
    }

    pub fn package_name_for(&self, package_path: &str) -> Option<&str> {
        self.package_names.get(package_path).map(String::as_str)
    }

    // ─── Stats ──────────────────────────────────────────────────

    pub fn stats(&self) -> RegistryStats {
        let count = |kind| self.types_of(kind).count();
        RegistryStats {
            records: count(TypeKind::Record),
            contracts: count(TypeKind::Contract),
            aliases: count(TypeKind::Alias),
            relations: self.graph.edge_count(),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub records: usize,
    pub contracts: usize,
    pub aliases: usize,
    pub relations: usize,
}
