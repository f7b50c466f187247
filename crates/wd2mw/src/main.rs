//! wd2mw CLI - Wikidot to MediaWiki migration.
//!
//! Provides commands for:
//! - `convert`: Convert a Wikidot site backup to MediaWiki pages
//! - `upload`: Upload converted pages and files to a MediaWiki site

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, UploadArgs};
use output::Output;

/// wd2mw - Wikidot to MediaWiki migration.
#[derive(Parser)]
#[command(name = "wd2mw", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Wikidot backup into MediaWiki pages.
    Convert(ConvertArgs),
    /// Upload converted pages and files to MediaWiki.
    Upload(UploadArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Convert(args) => args.verbose,
            Self::Upload(args) => args.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::Upload(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
