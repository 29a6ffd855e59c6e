//! The slice of Go syntax the analysis cares about.
//!
//! Lowered from the tree-sitter CST by [`super::lower`]. Type expressions are
//! a closed set of shapes; everything that consumes them matches on
//! [`TypeExpr`] exhaustively.

use std::fmt;

/// One parsed Go file.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    /// Name from the `package` clause.
    pub package_name: String,
    pub imports: Vec<ImportSpec>,
    /// Top-level type declarations, in source order.
    pub types: Vec<TypeDecl>,
    /// Top-level method declarations, in source order.
    pub methods: Vec<MethodDecl>,
    /// Set when lowering stopped early on a syntax error.
    pub syntax_error: Option<SyntaxError>,
}

/// Where lowering stopped. 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at {}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: ImportName,
    /// The import path without quotes, e.g. `net/http`.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportName {
    /// `import "fmt"`
    Default,
    /// `import f "fmt"`, also `_`.
    Alias(String),
    /// `import . "fmt"`
    Dot,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub def: TypeDef,
}

#[derive(Debug, Clone)]
pub enum TypeDef {
    /// `type T struct { ... }`
    Record(Vec<FieldDecl>),
    /// `type T interface { ... }`
    Contract(Vec<InterfaceMethod>),
    /// Any other named type, including `type T = U`.
    Alias(TypeExpr),
}

/// A struct field. Embedded fields have no names.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

impl FieldDecl {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMethod {
    pub name: String,
    pub signature: FuncSig,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    /// Receiver type, e.g. `*Dog`.
    pub receiver: Option<TypeExpr>,
    pub name: String,
    pub signature: FuncSig,
}

impl MethodDecl {
    /// Name of the receiver's base type when it is `T` or `*T`.
    pub fn receiver_type_name(&self) -> Option<&str> {
        match self.receiver.as_ref()? {
            TypeExpr::Named(name) => Some(name),
            TypeExpr::Pointer(inner) => match inner.as_ref() {
                TypeExpr::Named(name) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Parameters and results of a function type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuncSig {
    pub params: Vec<FieldDecl>,
    pub results: Vec<FieldDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A Go type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `T`
    Named(String),
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[N]T`, or `[]T` when `len` is `None`.
    Array {
        len: Option<String>,
        elem: Box<TypeExpr>,
    },
    /// `map[K]V`
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// `pkg.T`
    Qualified { package: String, name: String },
    /// `func(...) ...`
    Func(FuncSig),
    /// `chan T`, `chan<- T`, `<-chan T`
    Channel { dir: ChanDir, value: Box<TypeExpr> },
    /// `interface { ... }`
    InlineContract(Vec<InterfaceMethod>),
    /// `struct { ... }`
    InlineRecord(Vec<FieldDecl>),
    /// `...T`
    Ellipsis(Box<TypeExpr>),
    /// `(T)`
    Parenthesized(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn named(name: &str) -> Self {
        TypeExpr::Named(name.to_string())
    }

    pub fn qualified(package: &str, name: &str) -> Self {
        TypeExpr::Qualified {
            package: package.to_string(),
            name: name.to_string(),
        }
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Array {
            len: None,
            elem: Box::new(elem),
        }
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}
