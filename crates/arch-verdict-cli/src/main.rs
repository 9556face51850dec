//! arch-verdict CLI tool.
//!
//! Usage:
//! ```bash
//! arch-verdict check [OPTIONS] [GRAPH]
//! arch-verdict list-rules
//! arch-verdict init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Architecture rule evaluation over exported element graphs
#[derive(Parser)]
#[command(name = "arch-verdict")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the configured rules against an element graph
    Check {
        /// Element graph JSON (default: `[graph] path` from config)
        graph: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated)
        #[arg(long)]
        rules: Option<String>,

        /// Element name patterns to exclude (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for evaluation results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable failure reports.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One line per violation.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            graph,
            format,
            rules,
            exclude,
        } => {
            let source = config_resolver::resolve(std::path::Path::new("."), cli.config.as_deref());
            let options = commands::check::CheckOptions {
                graph,
                format,
                rules,
                exclude,
            };
            let passed = commands::check::run(&options, &source)?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(std::path::Path::new("."), force),
    }
}
