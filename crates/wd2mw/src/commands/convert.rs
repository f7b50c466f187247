//! `wd2mw convert` command implementation.

use std::path::PathBuf;

use clap::Args;
use wd2mw_config::{CliSettings, Config};
use wd2mw_migrate::{MigrationReport, Migrator};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Path to configuration file (default: auto-discover wd2mw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wikidot backup directory (overrides config).
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Directory to write converted pages to (overrides config).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if the migration fails or any page could not be
    /// converted.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let convert = &config.convert_resolved;
        tracing::debug!(config = ?config.config_path, "Loaded configuration");

        output.info(&format!(
            "Converting {} -> {}",
            convert.source_dir.display(),
            convert.output_dir.display()
        ));

        let report = Migrator::new(convert).run()?;
        print_report(&output, &report);

        if report.has_failures() {
            return Err(CliError::Incomplete(format!(
                "{} page(s) failed to convert",
                report.failed.len()
            )));
        }
        Ok(())
    }
}

fn print_report(output: &Output, report: &MigrationReport) {
    output.heading("\nConversion summary");
    output.info(&format!("Pages converted: {}", report.converted.len()));
    output.info(&format!("Files staged: {}", report.staged_files));

    if !report.missing_files.is_empty() {
        output.warning_list(
            &format!("\nMissing files ({}):", report.missing_files.len()),
            report
                .missing_files
                .iter()
                .map(|issue| format!("{}: {}", issue.page, issue.filename)),
        );
    }

    if !report.unreferenced_files.is_empty() {
        output.warning_list(
            &format!("\nUnreferenced files ({}):", report.unreferenced_files.len()),
            report
                .unreferenced_files
                .iter()
                .map(|issue| format!("{}: {}", issue.page, issue.filename)),
        );
    }

    if !report.orphans.is_empty() {
        output.warning_list(
            &format!("\nOrphaned pages ({}):", report.orphans.len()),
            &report.orphans,
        );
    }

    if report.failed.is_empty() {
        output.success("\nAll pages converted.");
    } else {
        output.error(&format!("\nFailed pages ({}):", report.failed.len()));
        for page in &report.failed {
            output.info(&format!("  - {}: {}", page.fullname, page.error));
        }
    }
}
