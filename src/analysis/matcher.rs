//! Structural implementation matching.

use std::collections::HashSet;

use crate::graph::{TypeId, TypeRegistry};

/// Records whose method signatures include every signature of `contract`,
/// in registration order. A contract without methods matches every record.
pub fn find_implementations(registry: &TypeRegistry, contract: TypeId) -> Vec<TypeId> {
    let required = &registry.get(contract).method_signatures;
    registry
        .records()
        .filter(|(_, record)| {
            let offered: HashSet<&str> = record.method_signatures.iter().map(String::as_str).collect();
            required.iter().all(|sig| offered.contains(sig.as_str()))
        })
        .map(|(id, _)| id)
        .collect()
}

/// Every (contract, record) implementation pair, contracts in registration order.
pub fn implementation_pairs(registry: &TypeRegistry) -> Vec<(TypeId, TypeId)> {
    registry
        .contracts()
        .flat_map(|(contract, _)| {
            find_implementations(registry, contract)
                .into_iter()
                .map(move |record| (contract, record))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{TypeIdentity, TypeKind};

    fn add(registry: &mut TypeRegistry, kind: TypeKind, name: &str, sigs: &[&str]) -> TypeId {
        let id = registry.register_type(kind, TypeIdentity::new("x.go", "zoo"), name);
        registry.get_mut(id).method_signatures = sigs.iter().map(|s| s.to_string()).collect();
        id
    }

    #[test]
    fn test_superset_matches() {
        let mut registry = TypeRegistry::new();
        let speaker = add(&mut registry, TypeKind::Contract, "Speaker", &["Speak()string"]);
        let dog = add(
            &mut registry,
            TypeKind::Record,
            "Dog",
            &["Speak()string", "Fetch()"],
        );
        let _rock = add(&mut registry, TypeKind::Record, "Rock", &[]);
        let _parrot = add(&mut registry, TypeKind::Record, "Parrot", &["Speak()int"]);

        assert_eq!(find_implementations(&registry, speaker), vec![dog]);
    }

    #[test]
    fn test_empty_contract_matches_every_record() {
        let mut registry = TypeRegistry::new();
        let any = add(&mut registry, TypeKind::Contract, "Any", &[]);
        let a = add(&mut registry, TypeKind::Record, "A", &[]);
        let b = add(&mut registry, TypeKind::Record, "B", &["M()"]);

        assert_eq!(find_implementations(&registry, any), vec![a, b]);
        assert_eq!(implementation_pairs(&registry), vec![(any, a), (any, b)]);
    }
}
