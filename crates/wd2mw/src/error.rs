//! CLI error types.

use wd2mw_config::ConfigError;
use wd2mw_mediawiki::{MediaWikiError, UploadError};
use wd2mw_migrate::MigrateError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Migrate(#[from] MigrateError),

    #[error("{0}")]
    MediaWiki(#[from] MediaWikiError),

    #[error("{0}")]
    Upload(#[from] UploadError),

    #[error("{0}")]
    Validation(String),

    /// The command ran to completion but some items failed.
    #[error("{0}")]
    Incomplete(String),
}
