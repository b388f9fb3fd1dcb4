//! recframe - inspect length-framed event record files
//!
//! Dumps records or scans a file for framing problems.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use recframe_reader::{ChecksumPolicy, PayloadFormat, ReaderConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recframe")]
#[command(about = "Inspect length-framed event record files")]
#[command(version)]
struct Cli {
    /// YAML reader configuration (defaults to $RECFRAME_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Largest payload length accepted, in bytes
    #[arg(long, global = true)]
    max_record_size: Option<u64>,

    /// Verify the masked CRC32C check fields
    #[arg(long, global = true)]
    verify_checksums: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every record in a file
    Dump {
        /// Framed file to read
        file: PathBuf,

        /// Payload format (raw, utf8, json)
        #[arg(short, long, default_value = "raw")]
        format: PayloadFormat,

        /// Stop after this many records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Summarize the framing of a file
    Scan {
        /// Framed file to read
        file: PathBuf,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return Ok(ExitCode::from(2));
        }
    };
    tracing::debug!("Reader configuration: {:?}", config);

    let outcome = match cli.command {
        Commands::Dump {
            file,
            format,
            limit,
        } => commands::dump(&file, format, limit, config)?,
        Commands::Scan { file } => commands::scan(&file, config)?,
    };

    println!("{}", outcome.output);
    if outcome.clean {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Builds the reader configuration: file (or $RECFRAME_CONFIG), env, then flags.
fn resolve_config(cli: &Cli) -> Result<ReaderConfig, recframe_reader::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = ReaderConfig::from_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => ReaderConfig::load()?,
    };

    if let Some(max) = cli.max_record_size {
        config.max_record_size = max;
    }
    if cli.verify_checksums {
        config.checksums = ChecksumPolicy::Verify;
    }

    config.validate()?;
    Ok(config)
}
