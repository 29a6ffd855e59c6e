//! Lowering from the tree-sitter-go CST to [`super::syntax`].
//!
//! Only top-level declarations are visited. Lowering stops at the first
//! top-level node that carries a syntax error.

use tree_sitter::Node;

use super::syntax::*;

pub(super) fn lower_file(root: Node<'_>, source: &[u8]) -> Result<SourceFile, String> {
    let mut file = SourceFile::default();
    let mut cursor = root.walk();

    for child in root.named_children(&mut cursor) {
        if child.is_error() || child.is_missing() || child.has_error() {
            let at = first_error(child).start_position();
            file.syntax_error = Some(SyntaxError {
                line: at.row + 1,
                column: at.column + 1,
            });
            break;
        }
        match child.kind() {
            "package_clause" => {
                if let Some(name) = first_named(child) {
                    file.package_name = text(name, source);
                }
            }
            "import_declaration" => lower_imports(child, source, &mut file.imports),
            "type_declaration" => lower_type_declaration(child, source, &mut file.types),
            "method_declaration" => file.methods.push(lower_method(child, source)),
            _ => {}
        }
    }

    if file.package_name.is_empty() {
        return Err(match file.syntax_error {
            Some(err) => format!("{} before package clause", err),
            None => "missing package clause".to_string(),
        });
    }
    Ok(file)
}

/// Package name from the `package` clause, ignoring everything else.
pub(super) fn package_name(root: Node<'_>, source: &[u8]) -> Option<String> {
    let mut cursor = root.walk();
    let clause = root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_clause")?;
    first_named(clause).map(|n| text(n, source))
}

fn first_error(node: Node<'_>) -> Node<'_> {
    if node.is_error() || node.is_missing() {
        return node;
    }
    let mut cursor = node.walk();
    let bad = node
        .children(&mut cursor)
        .find(|c| c.is_error() || c.is_missing() || c.has_error());
    match bad {
        Some(child) => first_error(child),
        None => node,
    }
}

fn text(node: Node<'_>, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or_default().to_string()
}

/// First named child that is not a comment.
fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|n| n.kind() != "comment");
    found
}

fn field_text(node: Node<'_>, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field).map(|n| text(n, source))
}

fn names_of(node: Node<'_>, source: &[u8]) -> Vec<String> {
    let mut cursor = node.walk();
    let names = node
        .children_by_field_name("name", &mut cursor)
        .map(|n| text(n, source))
        .collect();
    names
}

// ─── Imports ────────────────────────────────────────────────────

fn lower_imports(node: Node<'_>, source: &[u8], out: &mut Vec<ImportSpec>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => {
                if let Some(spec) = lower_import_spec(child, source) {
                    out.push(spec);
                }
            }
            "import_spec_list" => lower_imports(child, source, out),
            _ => {}
        }
    }
}

fn lower_import_spec(node: Node<'_>, source: &[u8]) -> Option<ImportSpec> {
    let raw = field_text(node, "path", source)?;
    let path = raw.trim_matches(|c| c == '"' || c == '`').to_string();
    let name = match node.child_by_field_name("name") {
        None => ImportName::Default,
        Some(n) if n.kind() == "dot" => ImportName::Dot,
        Some(n) => ImportName::Alias(text(n, source)),
    };
    Some(ImportSpec { name, path })
}

// ─── Declarations ───────────────────────────────────────────────

fn lower_type_declaration(node: Node<'_>, source: &[u8], out: &mut Vec<TypeDecl>) {
    let mut cursor = node.walk();
    for spec in node.named_children(&mut cursor) {
        let is_alias = match spec.kind() {
            "type_spec" => false,
            "type_alias" => true,
            _ => continue,
        };
        let (Some(name), Some(ty)) = (
            field_text(spec, "name", source),
            spec.child_by_field_name("type"),
        ) else {
            continue;
        };
        let def = match ty.kind() {
            "struct_type" if !is_alias => TypeDef::Record(lower_fields(ty, source)),
            "interface_type" if !is_alias => TypeDef::Contract(lower_interface(ty, source)),
            _ => TypeDef::Alias(lower_type(ty, source)),
        };
        out.push(TypeDecl { name, def });
    }
}

fn lower_method(node: Node<'_>, source: &[u8]) -> MethodDecl {
    let receiver = node.child_by_field_name("receiver").and_then(|list| {
        let mut cursor = list.walk();
        let param = list
            .named_children(&mut cursor)
            .find(|n| n.kind() == "parameter_declaration")?;
        param.child_by_field_name("type").map(|t| lower_type(t, source))
    });
    MethodDecl {
        receiver,
        name: field_text(node, "name", source).unwrap_or_default(),
        signature: lower_signature(node, source),
    }
}

/// Fields of a `struct_type`.
fn lower_fields(node: Node<'_>, source: &[u8]) -> Vec<FieldDecl> {
    let mut fields = Vec::new();
    let mut cursor = node.walk();
    let Some(list) = node
        .named_children(&mut cursor)
        .find(|n| n.kind() == "field_declaration_list")
    else {
        return fields;
    };

    let mut list_cursor = list.walk();
    for decl in list.named_children(&mut list_cursor) {
        if decl.kind() != "field_declaration" {
            continue;
        }
        let Some(ty_node) = decl.child_by_field_name("type") else {
            continue;
        };
        let names = names_of(decl, source);
        let mut ty = lower_type(ty_node, source);
        if names.is_empty() {
            let mut decl_cursor = decl.walk();
            let starred = decl.children(&mut decl_cursor).any(|c| c.kind() == "*");
            if starred {
                ty = TypeExpr::pointer(ty);
            }
        }
        fields.push(FieldDecl { names, ty });
    }
    fields
}

/// Methods of an `interface_type`. Embedded types and constraint
/// elements are skipped.
fn lower_interface(node: Node<'_>, source: &[u8]) -> Vec<InterfaceMethod> {
    let mut methods = Vec::new();
    collect_interface_methods(node, source, &mut methods);
    methods
}

fn collect_interface_methods(node: Node<'_>, source: &[u8], out: &mut Vec<InterfaceMethod>) {
    let mut cursor = node.walk();
    for elem in node.named_children(&mut cursor) {
        match elem.kind() {
            "method_elem" | "method_spec" => {
                if let Some(name) = field_text(elem, "name", source) {
                    out.push(InterfaceMethod {
                        name,
                        signature: lower_signature(elem, source),
                    });
                }
            }
            "method_spec_list" => collect_interface_methods(elem, source, out),
            _ => {}
        }
    }
}

/// Reads the `parameters` and `result` fields of a function-like node.
fn lower_signature(node: Node<'_>, source: &[u8]) -> FuncSig {
    let params = node
        .child_by_field_name("parameters")
        .map(|list| lower_params(list, source))
        .unwrap_or_default();
    let results = match node.child_by_field_name("result") {
        Some(list) if list.kind() == "parameter_list" => lower_params(list, source),
        Some(ty) => vec![FieldDecl {
            names: Vec::new(),
            ty: lower_type(ty, source),
        }],
        None => Vec::new(),
    };
    FuncSig { params, results }
}

fn lower_params(list: Node<'_>, source: &[u8]) -> Vec<FieldDecl> {
    let mut params = Vec::new();
    let mut cursor = list.walk();
    for param in list.named_children(&mut cursor) {
        let variadic = match param.kind() {
            "parameter_declaration" => false,
            "variadic_parameter_declaration" => true,
            _ => continue,
        };
        let Some(ty_node) = param.child_by_field_name("type") else {
            continue;
        };
        let mut ty = lower_type(ty_node, source);
        if variadic {
            ty = TypeExpr::Ellipsis(Box::new(ty));
        }
        params.push(FieldDecl {
            names: names_of(param, source),
            ty,
        });
    }
    params
}

// ─── Type expressions ───────────────────────────────────────────

fn lower_type(node: Node<'_>, source: &[u8]) -> TypeExpr {
    let child = |field: &str| {
        node.child_by_field_name(field)
            .map(|n| Box::new(lower_type(n, source)))
    };
    let raw = || TypeExpr::Named(text(node, source));

    match node.kind() {
        "type_identifier" | "identifier" => raw(),
        "qualified_type" => match (
            field_text(node, "package", source),
            field_text(node, "name", source),
        ) {
            (Some(package), Some(name)) => TypeExpr::Qualified { package, name },
            _ => raw(),
        },
        "pointer_type" => match first_named(node) {
            Some(inner) => TypeExpr::pointer(lower_type(inner, source)),
            None => raw(),
        },
        "slice_type" => match child("element") {
            Some(elem) => TypeExpr::Array { len: None, elem },
            None => raw(),
        },
        "array_type" | "implicit_length_array_type" => match child("element") {
            Some(elem) => TypeExpr::Array {
                len: Some(field_text(node, "length", source).unwrap_or_else(|| "...".to_string())),
                elem,
            },
            None => raw(),
        },
        "map_type" => match (child("key"), child("value")) {
            (Some(key), Some(value)) => TypeExpr::Map { key, value },
            _ => raw(),
        },
        "channel_type" => match child("value") {
            Some(value) => TypeExpr::Channel {
                dir: channel_dir(node),
                value,
            },
            None => raw(),
        },
        "function_type" => TypeExpr::Func(lower_signature(node, source)),
        "struct_type" => TypeExpr::InlineRecord(lower_fields(node, source)),
        "interface_type" => TypeExpr::InlineContract(lower_interface(node, source)),
        "parenthesized_type" => match first_named(node) {
            Some(inner) => TypeExpr::Parenthesized(Box::new(lower_type(inner, source))),
            None => raw(),
        },
        // Type arguments are dropped; only the base type is kept.
        "generic_type" => match node.child_by_field_name("type") {
            Some(base) => lower_type(base, source),
            None => raw(),
        },
        _ => raw(),
    }
}

fn channel_dir(node: Node<'_>) -> ChanDir {
    let mut cursor = node.walk();
    let tokens: Vec<&str> = node.children(&mut cursor).map(|c| c.kind()).collect();
    match tokens.iter().position(|k| *k == "<-") {
        Some(0) => ChanDir::Recv,
        Some(_) => ChanDir::Send,
        None => ChanDir::Both,
    }
}
