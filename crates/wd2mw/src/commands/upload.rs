//! `wd2mw upload` command implementation.

use std::path::PathBuf;

use clap::Args;
use wd2mw_config::{CliSettings, Config, ConfigError, MediaWikiConfig};
use wd2mw_mediawiki::{FileUploadReport, MediaWikiClient, PageUploadReport, Uploader};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the upload command.
#[derive(Args)]
pub(crate) struct UploadArgs {
    /// Path to configuration file (default: auto-discover wd2mw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory produced by `wd2mw convert` (default: configured output dir).
    #[arg(long)]
    source: Option<PathBuf>,

    /// MediaWiki `api.php` URL (overrides config).
    #[arg(long, env = "WD2MW_ENDPOINT")]
    endpoint: Option<String>,

    /// Upload pages only.
    #[arg(long, conflicts_with = "files_only")]
    pages_only: bool,

    /// Upload staged files only.
    #[arg(long)]
    files_only: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl UploadArgs {
    /// Execute the upload command.
    ///
    /// # Errors
    ///
    /// Returns an error if login fails, a page upload fails, or any file
    /// was rejected.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.source,
            endpoint: self.endpoint,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let mediawiki = require_mediawiki_config(&config, &output)?;
        let dir = &config.convert_resolved.output_dir;

        output.info(&format!("Endpoint: {}", mediawiki.endpoint));
        output.info(&format!("Bot username: {}", mediawiki.bot_username));

        let client = MediaWikiClient::new(&mediawiki.endpoint, mediawiki.verify_tls);
        client.login(&mediawiki.bot_username, &mediawiki.bot_password)?;
        output.success("Logged in.");

        let uploader = Uploader::new(&client);

        if !self.files_only {
            let pages = uploader.upload_pages(dir)?;
            print_page_report(&output, &pages);
        }

        if !self.pages_only {
            let files = uploader.upload_files(dir)?;
            print_file_report(&output, &files);
            if !files.failed.is_empty() {
                return Err(CliError::Incomplete(format!(
                    "{} file(s) failed to upload",
                    files.failed.len()
                )));
            }
        }

        Ok(())
    }
}

fn require_mediawiki_config<'a>(
    config: &'a Config,
    output: &Output,
) -> Result<&'a MediaWikiConfig, CliError> {
    config.require_mediawiki().map_err(|err| {
        if matches!(err, ConfigError::Validation(_)) && config.mediawiki.is_none() {
            output.error("Error: mediawiki configuration required in wd2mw.toml");
            output.info("\nAdd the following to your wd2mw.toml:");
            output.info("\n[mediawiki]");
            output.info(r#"endpoint = "https://wiki.example.com/api.php""#);
            output.info(r#"bot_username = "Migrator@bot""#);
            output.info(r#"bot_password = "${WD2MW_BOT_PASSWORD}""#);
        }
        CliError::from(err)
    })
}

fn print_page_report(output: &Output, report: &PageUploadReport) {
    output.success(&format!(
        "Pages: {} created, {} updated, {} unchanged",
        report.created, report.updated, report.unchanged
    ));
}

fn print_file_report(output: &Output, report: &FileUploadReport) {
    let summary = format!(
        "Files: {} uploaded, {} unchanged, {} failed",
        report.uploaded,
        report.unchanged,
        report.failed.len()
    );
    if report.failed.is_empty() {
        output.success(&summary);
        return;
    }
    output.warning_list(
        &summary,
        report
            .failed
            .iter()
            .map(|failed| format!("{}: {}", failed.filename, failed.error)),
    );
}
