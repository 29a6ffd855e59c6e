//! Go front end: tree-sitter parsing plus lowering into [`syntax`].

pub mod language;
mod lower;
pub mod syntax;

use std::path::Path;
use tree_sitter::Parser;

use crate::error::{GoumlError, Result};

pub use language::{is_go_source, SOURCE_SUFFIX, TEST_SUFFIX};
pub use syntax::{
    ChanDir, FieldDecl, FuncSig, ImportName, ImportSpec, InterfaceMethod, MethodDecl, SourceFile,
    SyntaxError, TypeDecl, TypeDef, TypeExpr,
};

/// A reusable Go parser.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: language::go_parser()?,
        })
    }

    /// Parse and lower one file. `path` is only used for error messages.
    ///
    /// A syntax error does not fail the call: declarations before it are
    /// returned and [`SourceFile::syntax_error`] is set.
    pub fn parse(&mut self, path: &Path, source: &str) -> Result<SourceFile> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| GoumlError::Parse {
                path: path.to_path_buf(),
                message: "parser produced no tree".to_string(),
            })?;
        lower::lower_file(tree.root_node(), source.as_bytes()).map_err(|message| {
            GoumlError::Parse {
                path: path.to_path_buf(),
                message,
            }
        })
    }

    /// Just the package name of a file.
    pub fn package_name(&mut self, source: &str) -> Option<String> {
        let tree = self.parser.parse(source, None)?;
        lower::package_name(tree.root_node(), source.as_bytes())
    }
}

/// Parse a single file with a fresh parser.
pub fn parse_file(path: &Path, source: &str) -> Result<SourceFile> {
    GoParser::new()?.parse(path, source)
}
