//! Crossref CLI - name resolution and cross-reference graphs from the
//! command line.
//!
//! Reads a repository model (JSON, as written by a language extractor),
//! runs the resolution pipeline and reports on the result.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// Crossref: name resolution and cross-reference graphs.
#[derive(Parser)]
#[command(name = "crossref")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// YAML file with resolve options
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Process projects in parallel (overrides the config file)
    #[arg(long, global = true)]
    parallel: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a model and show summary statistics
    Resolve {
        /// Repository model (JSON)
        model: PathBuf,

        /// Write the fully-qualified model to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List ambiguous names and their candidates
    Ambiguities {
        /// Repository model (JSON)
        model: PathBuf,
    },

    /// Show relation counts
    Relations {
        /// Repository model (JSON)
        model: PathBuf,

        /// Source entity (e.g., "`App.Services.Worker`")
        #[arg(short, long, requires = "target")]
        source: Option<String>,

        /// Target entity (e.g., "`App.Models.User`")
        #[arg(short, long, requires = "source")]
        target: Option<String>,
    },

    /// Detect circular type dependencies
    Cycles {
        /// Repository model (JSON)
        model: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = match cli::load_options(cli.config.as_deref(), cli.parallel) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Resolve { model, output } => cli::resolve::run(&model, output.as_deref(), &options),
        Commands::Ambiguities { model } => cli::ambiguities::run(&model, &options),
        Commands::Relations {
            model,
            source,
            target,
        } => cli::relations::run(&model, source.as_deref(), target.as_deref(), &options),
        Commands::Cycles { model } => cli::cycles::run(&model, &options),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
