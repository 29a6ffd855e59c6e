//! gouml CLI - class diagrams for Go codebases.
//!
//! Usage:
//!   gouml --source-root <DIR> --library-root <GOPATH>   # write uml.puml
//!   gouml -c gouml.toml -o shop.puml                    # config file + override
//!   gouml show-config                                   # effective configuration

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gouml::cli::{Cli, Commands};
use gouml::{analyze, write_output, AnalysisConfig};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = AnalysisConfig::load(&cli.config)?;
    let config = cli.overrides().apply(config);

    match cli.selected_command() {
        Commands::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
        Commands::Generate => {
            let output = config.output.clone();
            let analysis = analyze(config)?;

            write_output(&output, &analysis.render())
                .with_context(|| format!("cannot write {}", output.display()))?;
            info!(output = %output.display(), "diagram written");

            if let Some(path) = &cli.diagnostics {
                let json = analysis.diagnostics().to_json()?;
                write_output(path, &json)
                    .with_context(|| format!("cannot write {}", path.display()))?;
                info!(path = %path.display(), "diagnostics written");
            }

            eprintln!("{}", analysis.stats());
        }
    }
    Ok(())
}
