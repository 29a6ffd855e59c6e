//! Reference resolution, import binding, signatures and matching.

pub mod diagnostics;
pub mod imports;
pub mod matcher;
pub mod resolver;
pub mod signature;
pub mod stdlib;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use imports::{ImportBinder, ImportBinding, PackageProbe, DOT_ALIAS};
pub use matcher::{find_implementations, implementation_pairs};
pub use resolver::{is_base_type, FileScope, PackageLookup, ResolvedType, TypeResolver};
pub use signature::{method_signature, AsWritten, TypeNamer};
pub use stdlib::{seed_std_packages, STD_PACKAGES};
