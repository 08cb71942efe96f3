//! lcia - Command-line interface for the LCIA formatter
//!
//! Converts characterization-factor tables into openLCA JSON-LD packages.

use clap::{CommandFactory, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::*;
use config::LciaConfig;
use output::OutputFormat;

/// Convert LCIA characterization factors to openLCA JSON-LD.
#[derive(Parser)]
#[command(name = "lcia")]
#[command(author, version)]
#[command(about = "Convert LCIA characterization factors to openLCA JSON-LD")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  lcia inspect traci.csv              Summarize a factor table
  lcia convert traci.csv traci.zip    Write a JSON-LD package
  lcia convert traci.csv --dry-run    Build the graph without writing")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Config file (default: ./.lciarc.toml)
    #[arg(long, global = true, env = "LCIA_CONFIG")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a characterization-factor CSV into a JSON-LD zip package
    #[command(visible_alias = "c")]
    Convert {
        /// Input CSV table
        input: String,

        /// Output zip package
        #[arg(required_unless_present = "dry_run")]
        output: Option<String>,

        /// Also write elementary flow entities
        #[arg(long)]
        write_flows: bool,

        /// Build the entity graph without writing a package
        #[arg(long)]
        dry_run: bool,
    },

    /// Summarize a characterization-factor CSV
    #[command(visible_alias = "i")]
    Inspect {
        /// Input CSV table
        input: String,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => LciaConfig::load_file(Path::new(path)),
        None => LciaConfig::load(Path::new(".")),
    };

    // CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    let use_color = config
        .use_color()
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    colored::control::set_override(use_color);

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    match command {
        Commands::Convert {
            input,
            output,
            write_flows,
            dry_run,
        } => convert::run(
            &input,
            output.as_deref(),
            write_flows,
            dry_run,
            &config,
            format,
        ),
        Commands::Inspect { input } => inspect::run(&input, &config, format),
    }
}
