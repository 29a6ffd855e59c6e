//! # gouml
//!
//! Class diagrams for Go codebases.
//!
//! gouml walks a Go source tree, registers every struct, interface and
//! named type it declares, resolves the types that struct fields refer to
//! across packages, and renders the result as a PlantUML class diagram with
//! embed, has-a and implementation edges.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gouml::{analyze, AnalysisConfig};
//!
//! let config = AnalysisConfig {
//!     source_root: "/go/src/example.com/shop".into(),
//!     library_root: "/go".into(),
//!     ..AnalysisConfig::default()
//! };
//! let analysis = analyze(config)?;
//! println!("{}", analysis.render());
//! # Ok::<(), gouml::GoumlError>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod diagram;
pub mod error;
pub mod graph;
pub mod parser;

use std::fs;
use std::path::Path;

pub use analysis::{Diagnostic, DiagnosticKind, Diagnostics};
pub use config::{AnalysisConfig, ConfigOverrides};
pub use diagram::render_plantuml;
pub use error::{GoumlError, Result};
pub use graph::{analyze, Analysis, AnalysisStats, Analyzer, Declarations, TypeRegistry};
pub use parser::GoParser;

/// Write a text artifact, creating parent directories as needed.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// A throwaway GOPATH. Files are given relative to `<gopath>/src`.
    struct Gopath {
        dir: TempDir,
        root: PathBuf,
    }

    impl Gopath {
        fn new(files: &[(&str, &str)]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().join("gopath");
            for (rel, body) in files {
                let path = root.join("src").join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, body).unwrap();
            }
            Self { dir, root }
        }

        fn config(&self, source: &str) -> AnalysisConfig {
            AnalysisConfig {
                source_root: self.root.join("src").join(source),
                library_root: self.root.clone(),
                ..AnalysisConfig::default()
            }
        }
    }

    fn lines(document: &str) -> Vec<&str> {
        document.lines().collect()
    }

    const ZOO: &str = r#"package zoo

import "app/food"

type Speaker interface {
    Speak() string
}

type Feeder interface {
    Feed(f *food.Bone, times int) error
}

type Dog struct {
    Speaker
    Name  string
    Bones []*food.Bone
}

func (d *Dog) Speak() string { return "woof" }

func (d *Dog) Feed(b *food.Bone, n int) error { return nil }

type Rock struct {
    Weight int
}
"#;

    const FOOD: &str = "package food\n\ntype Bone struct {\n    Size int\n}\n";

    #[test]
    fn test_single_package_document() {
        let gopath = Gopath::new(&[(
            "app/shop/shop.go",
            r#"package shop

type ID string

type Widget struct {
    Items []Record
    Owner *Record
    Tags  map[string]*Record
    Key   ID
}

type Record struct {
    Name string
}
"#,
        )]);
        let analysis = analyze(gopath.config("app")).unwrap();

        let ns = "app\\\\shop";
        let expected = [
            "@startuml".to_string(),
            format!("namespace {} {{", ns),
            " class Widget {".to_string(),
            "  Items []Record".to_string(),
            "  Owner *Record".to_string(),
            "  Tags map[string]*Record".to_string(),
            "  Key ID".to_string(),
            "} ".to_string(),
            "}".to_string(),
            format!("namespace {} {{", ns),
            " class Record {".to_string(),
            "  Name string".to_string(),
            "} ".to_string(),
            "}".to_string(),
            format!("{ns}.Record ---> \"*\" {ns}.Widget : Items"),
            format!("{ns}.Record ---> {ns}.Widget : Owner"),
            format!("{ns}.Record ---> \"*\" {ns}.Widget : Tags"),
            "@enduml".to_string(),
        ]
        .join("\n");
        assert_eq!(analysis.render(), expected);
        assert!(analysis.diagnostics().is_empty());
    }

    #[test]
    fn test_embeds_and_implementations_across_packages() {
        let gopath = Gopath::new(&[
            ("app/zoo/zoo.go", ZOO),
            ("app/zoo/zoo_test.go", "package zoo\n\ntype Mock struct{}\n"),
            ("app/food/bone.go", FOOD),
        ]);
        let analysis = analyze(gopath.config("app")).unwrap();
        let document = analysis.render();
        let lines = lines(&document);

        assert!(lines.contains(&"app\\\\zoo.Speaker <|- app\\\\zoo.Dog"));
        assert!(lines.contains(&"app\\\\food.Bone ---> \"*\" app\\\\zoo.Dog : Bones"));
        // The embedded contract yields no has-a relation.
        assert!(!lines.iter().any(|l| l.contains("Speaker --->")));

        let implementations: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|l| l.starts_with("app\\\\zoo.Speaker <|-") || l.starts_with("app\\\\zoo.Feeder <|-"))
            .collect();
        // Embed line first, then one implementation per contract.
        assert_eq!(
            implementations,
            vec![
                "app\\\\zoo.Speaker <|- app\\\\zoo.Dog",
                "app\\\\zoo.Speaker <|- app\\\\zoo.Dog",
                "app\\\\zoo.Feeder <|- app\\\\zoo.Dog",
            ]
        );
        assert!(!document.contains("Rock <|-"));
        assert!(!document.contains("Mock"));

        let dog = analysis
            .registry()
            .find(graph::TypeKind::Record, "app/zoo", "Dog")
            .unwrap();
        assert_eq!(
            analysis.registry().get(dog).method_signatures,
            vec![
                "Speak()string".to_string(),
                "Feed(*app/food.Bone,int)error".to_string()
            ]
        );
    }

    #[test]
    fn test_type_names_are_unique_per_package() {
        let gopath = Gopath::new(&[
            ("app/a/a.go", "package a\n\ntype Item struct{ N int }\n"),
            ("app/b/b.go", "package b\n\ntype Item struct{ N int }\n"),
        ]);
        let analysis = analyze(gopath.config("app")).unwrap();
        let names: Vec<String> = analysis
            .registry()
            .records()
            .map(|(_, node)| node.unique_name())
            .collect();
        assert_eq!(names, vec!["app\\\\a.Item", "app\\\\b.Item"]);
    }

    #[test]
    fn test_shared_alias_resolved_by_declaring_package() {
        let gopath = Gopath::new(&[
            (
                "app/api/api.go",
                r#"package api

import (
    "app/v1/models"
    "app/v2/models"
)

type Handler struct {
    Legacy  models.Account
    Current models.Profile
}
"#,
            ),
            ("app/v1/models/account.go", "package models\n\ntype Account struct{}\n"),
            ("app/v2/models/profile.go", "package models\n\ntype Profile struct{}\n"),
        ]);
        let analysis = analyze(gopath.config("app")).unwrap();
        let document = analysis.render();
        let lines = lines(&document);
        assert!(lines.contains(&"app\\\\v1\\\\models.Account ---> app\\\\api.Handler : Legacy"));
        assert!(lines.contains(&"app\\\\v2\\\\models.Profile ---> app\\\\api.Handler : Current"));
        assert!(analysis.diagnostics().is_empty());
    }

    #[test]
    fn test_dot_import_and_vendor_package() {
        let gopath = Gopath::new(&[
            (
                "app/kennel/kennel.go",
                r#"package kennel

import (
    . "app/food"
    "github.com/acme/kit"
)

type Kennel struct {
    Bone
    Tool kitty.Tool
}
"#,
            ),
            ("app/food/bone.go", FOOD),
            (
                "app/vendor/github.com/acme/kit/tool.go",
                "package kitty\n\ntype Tool struct{}\n",
            ),
        ]);
        let mut config = gopath.config("app");
        config.vendor_root = Some(config.source_root.join("vendor"));
        let analysis = analyze(config).unwrap();
        let document = analysis.render();
        let lines = lines(&document);

        assert!(lines.contains(&"app\\\\food.Bone <|- app\\\\kennel.Kennel"));
        assert!(lines.contains(&"github.com\\\\acme\\\\kit.Tool ---> app\\\\kennel.Kennel : Tool"));
        assert!(analysis.diagnostics().is_empty());
    }

    #[test]
    fn test_unresolved_reference_is_a_diagnostic() {
        let gopath = Gopath::new(&[(
            "app/svc/svc.go",
            "package svc\n\ntype Service struct {\n    Dec json.Decoder\n    Peer Unknown\n}\n",
        )]);
        let analysis = analyze(gopath.config("app")).unwrap();
        assert_eq!(
            analysis
                .diagnostics()
                .of_kind(DiagnosticKind::UnresolvedReference)
                .count(),
            2
        );
        assert!(analysis.render().contains(" class Service {"));
        assert!(!analysis.render().contains("--->"));
    }

    #[test]
    fn test_syntax_error_keeps_earlier_declarations() {
        let gopath = Gopath::new(&[
            (
                "app/broken/broken.go",
                "package broken\n\ntype Good struct {\n    Name string\n}\n\ntype Bad struct {\n    {{\n}\n",
            ),
            ("app/fine/fine.go", "package fine\n\ntype Fine struct{}\n"),
        ]);
        let analysis = analyze(gopath.config("app")).unwrap();
        let failures: Vec<&Diagnostic> = analysis
            .diagnostics()
            .of_kind(DiagnosticKind::ParseFailure)
            .collect();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].file.as_ref().unwrap().ends_with("broken.go"));

        let document = analysis.render();
        assert!(document.contains(" class Good {"));
        assert!(document.contains(" class Fine {"));
        assert!(!document.contains(" class Bad {"));
    }

    #[test]
    fn test_ignored_prefixes() {
        let gopath = Gopath::new(&[
            ("app/keep/keep.go", "package keep\n\ntype Keep struct{}\n"),
            ("app/gen/gen.go", "package gen\n\ntype Generated struct{}\n"),
        ]);
        let mut config = gopath.config("app");
        config.ignored_prefixes = vec!["gen/".to_string()];
        let document = analyze(config).unwrap().render();
        assert!(document.contains("class Keep"));
        assert!(!document.contains("Generated"));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let gopath = Gopath::new(&[
            ("app/zoo/zoo.go", ZOO),
            ("app/food/bone.go", FOOD),
        ]);
        let first = analyze(gopath.config("app")).unwrap().render();
        let second = analyze(gopath.config("app")).unwrap().render();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_roots_abort() {
        let gopath = Gopath::new(&[]);
        let err = analyze(gopath.config("nowhere")).err().unwrap();
        assert!(matches!(err, GoumlError::SourceRootMissing(_)));

        let config = AnalysisConfig {
            source_root: gopath.dir.path().to_path_buf(),
            library_root: gopath.root.join("missing"),
            ..AnalysisConfig::default()
        };
        let err = analyze(config).err().unwrap();
        assert!(matches!(err, GoumlError::LibraryRootMissing(_)));
    }

    #[test]
    fn test_stats() {
        let gopath = Gopath::new(&[
            ("app/zoo/zoo.go", ZOO),
            ("app/food/bone.go", FOOD),
            ("app/food/grams.go", "package food\n\ntype Grams int\n"),
        ]);
        let stats = analyze(gopath.config("app")).unwrap().stats();
        assert_eq!(stats.files, 3);
        assert_eq!(stats.types.records, 3);
        assert_eq!(stats.types.contracts, 2);
        assert_eq!(stats.types.aliases, 1);
        assert_eq!(stats.types.relations, 2);
        assert_eq!(stats.diagnostics, 0);
        assert_eq!(
            stats.to_string(),
            "Analyzed 3 files: 3 classes, 2 interfaces, 1 named types, 2 relations, 0 diagnostics"
        );
    }

    #[test]
    fn test_write_output_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/diagram.puml");
        write_output(&path, "@startuml\n@enduml").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "@startuml\n@enduml");
    }
}
