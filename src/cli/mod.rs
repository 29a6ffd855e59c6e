//! Command-line interface for gouml.
//!
//! Commands:
//! - generate (default): analyze the tree and write the diagram
//! - show-config: print the effective configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "gouml.toml";

#[derive(Parser, Debug)]
#[command(name = "gouml")]
#[command(about = "Class diagrams for Go codebases", version)]
pub struct Cli {
    /// TOML config file; flags override its values
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Root of the Go tree to analyze
    #[arg(short, long)]
    pub source_root: Option<PathBuf>,

    /// GOPATH-style root holding src/
    #[arg(short, long, env = "GOPATH")]
    pub library_root: Option<PathBuf>,

    /// Vendor directory probed before the library root
    #[arg(long)]
    pub vendor_root: Option<PathBuf>,

    /// Where to write the PlantUML document
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip files under this path prefix (repeatable)
    #[arg(short, long = "ignore", value_name = "PREFIX")]
    pub ignore: Vec<String>,

    /// Also write collected diagnostics as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub diagnostics: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Analyze the source tree and write the diagram
    Generate,

    /// Print the effective configuration as TOML
    ShowConfig,
}

impl Cli {
    pub fn selected_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Generate)
    }

    /// Flag values to layer over the config file.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            source_root: self.source_root.clone(),
            library_root: self.library_root.clone(),
            vendor_root: self.vendor_root.clone(),
            output: self.output.clone(),
            ignored_prefixes: self.ignore.clone(),
        }
    }

    /// Default filter directive when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
