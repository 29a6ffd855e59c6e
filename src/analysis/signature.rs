//! Text rendering of Go types, fields and method signatures.
//!
//! The same walk serves two purposes: the diagram bodies show types as
//! written ([`AsWritten`]), while method signatures used for implementation
//! matching qualify names by package ([`TypeResolver`](super::TypeResolver)).

use crate::parser::{ChanDir, FieldDecl, FuncSig, InterfaceMethod, TypeExpr};

/// Decides how type names are spelled.
pub trait TypeNamer {
    /// An unqualified name, e.g. `Dog` or `int`.
    fn named(&mut self, name: &str) -> String;
    /// A `package.Name` reference.
    fn qualified(&mut self, package: &str, name: &str) -> String;
}

/// Names exactly as they appear in the source.
pub struct AsWritten;

impl TypeNamer for AsWritten {
    fn named(&mut self, name: &str) -> String {
        name.to_string()
    }

    fn qualified(&mut self, package: &str, name: &str) -> String {
        format!("{}.{}", package, name)
    }
}

pub fn type_text<N: TypeNamer + ?Sized>(expr: &TypeExpr, namer: &mut N) -> String {
    match expr {
        TypeExpr::Named(name) => namer.named(name),
        TypeExpr::Qualified { package, name } => namer.qualified(package, name),
        TypeExpr::Pointer(inner) => format!("*{}", type_text(inner, namer)),
        TypeExpr::Array { len, elem } => {
            format!("[{}]{}", len.as_deref().unwrap_or(""), type_text(elem, namer))
        }
        TypeExpr::Map { key, value } => {
            let key = type_text(key, namer);
            format!("map[{}]{}", key, type_text(value, namer))
        }
        TypeExpr::Channel { dir, value } => {
            let prefix = match dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            };
            format!("{}{}", prefix, type_text(value, namer))
        }
        TypeExpr::Func(sig) => format!("func{}", params_text(sig, namer)),
        TypeExpr::InlineContract(methods) => {
            let methods: Vec<String> = methods.iter().map(|m| method_line(m, namer)).collect();
            inline_block("interface", &methods)
        }
        TypeExpr::InlineRecord(fields) => {
            let fields: Vec<String> = fields.iter().map(|f| field_text(f, namer)).collect();
            inline_block("struct", &fields)
        }
        TypeExpr::Ellipsis(inner) => format!("...{}", type_text(inner, namer)),
        TypeExpr::Parenthesized(inner) => format!("({})", type_text(inner, namer)),
    }
}

fn inline_block(keyword: &str, members: &[String]) -> String {
    if members.is_empty() {
        format!("{} {{}}", keyword)
    } else {
        format!("{} {{ {} }}", keyword, members.join("; "))
    }
}

/// `a,b Type`, or just `Type` for unnamed fields.
pub fn field_text<N: TypeNamer + ?Sized>(field: &FieldDecl, namer: &mut N) -> String {
    let ty = type_text(&field.ty, namer);
    if field.names.is_empty() {
        ty
    } else {
        format!("{} {}", field.names.join(","), ty)
    }
}

/// `(a int,b string)(int,error)` with parameter names kept.
pub fn params_text<N: TypeNamer + ?Sized>(sig: &FuncSig, namer: &mut N) -> String {
    let params: Vec<String> = sig.params.iter().map(|p| field_text(p, namer)).collect();
    let results: Vec<String> = sig.results.iter().map(|r| field_text(r, namer)).collect();
    let wrap = results.len() >= 2 || sig.results.first().is_some_and(|r| !r.names.is_empty());
    if wrap {
        format!("({})({})", params.join(","), results.join(","))
    } else {
        format!("({}){}", params.join(","), results.join(","))
    }
}

/// An interface method as shown in a diagram body, e.g. `Feed(a Animal)error`.
pub fn method_line<N: TypeNamer + ?Sized>(method: &InterfaceMethod, namer: &mut N) -> String {
    format!("{}{}", method.name, params_text(&method.signature, namer))
}

/// Normalized signature used to compare methods: names are dropped and a
/// field with several names contributes its type once per name.
///
/// `Feed(a, b Animal) (n int, err error)` becomes `Feed(Animal,Animal)(int,error)`.
pub fn method_signature<N: TypeNamer + ?Sized>(name: &str, sig: &FuncSig, namer: &mut N) -> String {
    let params = expanded_types(&sig.params, namer);
    let results = expanded_types(&sig.results, namer);
    let results = match results.len() {
        0 => String::new(),
        1 => results.join(""),
        _ => format!("({})", results.join(",")),
    };
    format!("{}({}){}", name, params.join(","), results)
}

fn expanded_types<N: TypeNamer + ?Sized>(fields: &[FieldDecl], namer: &mut N) -> Vec<String> {
    let mut types = Vec::new();
    for field in fields {
        let ty = type_text(&field.ty, namer);
        for _ in 0..field.names.len().max(1) {
            types.push(ty.clone());
        }
    }
    types
}
