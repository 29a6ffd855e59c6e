//! Type graph: the registry of discovered Go types and the builder that
//! fills it from a source tree.

pub mod builder;
pub mod registry;
pub mod types;

pub use builder::{analyze, package_path_of, Analysis, AnalysisStats, Analyzer, Declarations};
pub use registry::{RegistryStats, TypeId, TypeRegistry};
pub use types::{
    namespace_of, Multiplicity, Relation, RelationKind, TypeIdentity, TypeKind, TypeNode,
};
