//! Go grammar loading and source-file eligibility.

use std::path::Path;
use tree_sitter::{Language, Parser};

use crate::error::Result;

/// Suffix of every Go source file.
pub const SOURCE_SUFFIX: &str = ".go";

/// Suffix of Go test files, which never take part in the analysis.
pub const TEST_SUFFIX: &str = "_test.go";

/// The tree-sitter Language for Go.
pub fn go_language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

/// A parser with the Go grammar loaded.
pub fn go_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser.set_language(&go_language())?;
    Ok(parser)
}

/// Whether the file name looks like non-test Go source.
pub fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(SOURCE_SUFFIX) && !name.ends_with(TEST_SUFFIX)
}
