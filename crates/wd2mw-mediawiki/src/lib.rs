//! MediaWiki upload for wd2mw.
//!
//! [`MediaWikiClient`] talks to a wiki's `api.php` with a bot password.
//! [`Uploader`] pushes a `wd2mw convert` output directory to any [`Wiki`]:
//!
//! ```no_run
//! use std::path::Path;
//! use wd2mw_mediawiki::{MediaWikiClient, Uploader};
//!
//! let client = MediaWikiClient::new("https://wiki.example.com/api.php", true);
//! client.login("Migrator@bot", "secret")?;
//!
//! let uploader = Uploader::new(&client);
//! uploader.upload_pages(Path::new("output"))?;
//! let files = uploader.upload_files(Path::new("output"))?;
//! assert!(files.failed.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod error;
mod types;
mod uploader;

pub use client::MediaWikiClient;
pub use error::{MediaWikiError, UploadError};
pub use types::{EditOutcome, UploadOutcome};
pub use uploader::{FailedFile, FileUploadReport, PageUploadReport, Uploader, Wiki};
