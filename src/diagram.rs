//! PlantUML output.
//!
//! Bodies are rendered per type during the second pass; [`render_plantuml`]
//! only concatenates them with the relation and implementation lines.

use crate::analysis::signature::{field_text, method_line, AsWritten};
use crate::analysis::implementation_pairs;
use crate::graph::{namespace_of, TypeRegistry};
use crate::parser::{FieldDecl, InterfaceMethod};

/// `namespace NS {\n class Name {\n  field\n} \n}`
pub fn record_body(package_path: &str, name: &str, fields: &[FieldDecl]) -> String {
    let members: Vec<String> = fields.iter().map(|f| field_text(f, &mut AsWritten)).collect();
    wrap(package_path, "class", name, &members)
}

/// `namespace NS {\n interface Name {\n  Method()\n} \n}`
pub fn contract_body(package_path: &str, name: &str, methods: &[InterfaceMethod]) -> String {
    let members: Vec<String> = methods.iter().map(|m| method_line(m, &mut AsWritten)).collect();
    wrap(package_path, "interface", name, &members)
}

fn wrap(package_path: &str, keyword: &str, name: &str, members: &[String]) -> String {
    let mut block = format!("{} {} {{\n", keyword, name);
    for member in members {
        block.push_str("  ");
        block.push_str(member);
        block.push('\n');
    }
    block.push('}');
    format!("namespace {} {{\n {} \n}}", namespace_of(package_path), block)
}

/// The whole document: record bodies, contract bodies, relations, then
/// implementations, each in registration order. Types never reached by the
/// second pass have no body and are left out.
pub fn render_plantuml(registry: &TypeRegistry) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.extend(
        registry
            .records()
            .chain(registry.contracts())
            .filter(|(_, node)| !node.body.is_empty())
            .map(|(_, node)| node.body.clone()),
    );
    lines.extend(registry.relations().map(|(_, _, relation)| relation.rendered.clone()));
    lines.extend(
        implementation_pairs(registry)
            .into_iter()
            .map(|(contract, record)| {
                format!(
                    "{} <|- {}",
                    registry.get(contract).unique_name(),
                    registry.get(record).unique_name()
                )
            }),
    );

    let mut document = String::from("@startuml\n");
    for line in lines {
        document.push_str(&line);
        document.push('\n');
    }
    document.push_str("@enduml");
    document
}
