//! Batch upload of a converted output directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::client::MediaWikiClient;
use crate::error::{MediaWikiError, UploadError};
use crate::types::{EditOutcome, UploadOutcome};

/// Extension of converted page files.
const PAGE_EXTENSION: &str = "mktxt";

/// Directory under the output directory holding staged files.
const STAGING_DIR: &str = "files_to_upload";

/// Write operations the uploader needs from a wiki.
pub trait Wiki {
    /// Create or replace a page.
    ///
    /// # Errors
    ///
    /// Returns an error if the wiki rejects the edit.
    fn edit_page(&self, title: &str, text: &str) -> Result<EditOutcome, MediaWikiError>;

    /// Upload a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the wiki rejects the upload.
    fn upload_file(&self, filename: &str, data: &[u8]) -> Result<UploadOutcome, MediaWikiError>;
}

impl Wiki for MediaWikiClient {
    fn edit_page(&self, title: &str, text: &str) -> Result<EditOutcome, MediaWikiError> {
        Self::edit_page(self, title, text)
    }

    fn upload_file(&self, filename: &str, data: &[u8]) -> Result<UploadOutcome, MediaWikiError> {
        Self::upload_file(self, filename, data)
    }
}

/// Counts from a page upload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageUploadReport {
    /// Pages that did not exist before.
    pub created: usize,
    /// Pages whose text changed.
    pub updated: usize,
    /// Pages that already had this text.
    pub unchanged: usize,
}

/// A file the wiki rejected.
#[derive(Debug)]
pub struct FailedFile {
    /// Staged file name.
    pub filename: String,
    /// Why it failed.
    pub error: MediaWikiError,
}

/// Outcome of a file upload; failures do not stop the batch.
#[derive(Debug, Default)]
pub struct FileUploadReport {
    /// Files stored.
    pub uploaded: usize,
    /// Files identical to the wiki's current version.
    pub unchanged: usize,
    /// Files the wiki rejected, in upload order.
    pub failed: Vec<FailedFile>,
}

/// Uploads pages and staged files from an output directory.
pub struct Uploader<'a, W: Wiki> {
    wiki: &'a W,
}

impl<'a, W: Wiki> Uploader<'a, W> {
    /// Create an uploader writing to `wiki`.
    #[must_use]
    pub fn new(wiki: &'a W) -> Self {
        Self { wiki }
    }

    /// Upload every `*.mktxt` file in `dir`, sorted, titled by file stem.
    ///
    /// # Errors
    ///
    /// Stops at the first page that cannot be read or uploaded.
    pub fn upload_pages(&self, dir: &Path) -> Result<PageUploadReport, UploadError> {
        let pages = list_files(dir, |path| {
            path.extension().is_some_and(|ext| ext == PAGE_EXTENSION)
        })?;
        info!(count = pages.len(), dir = %dir.display(), "Found pages");

        let mut report = PageUploadReport::default();
        for path in pages {
            let Some(title) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!(path = %path.display(), "Skipping page with non-UTF-8 name");
                continue;
            };
            let text = fs::read_to_string(&path).map_err(|source| UploadError::Io {
                path: path.clone(),
                source,
            })?;

            let outcome = self
                .wiki
                .edit_page(title, &text)
                .map_err(|source| UploadError::Page {
                    title: title.to_owned(),
                    source,
                })?;
            match outcome {
                EditOutcome::Created => report.created += 1,
                EditOutcome::Updated => report.updated += 1,
                EditOutcome::Unchanged => report.unchanged += 1,
            }
        }
        Ok(report)
    }

    /// Upload every file in `dir/files_to_upload`, sorted.
    ///
    /// A missing staging directory uploads nothing.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Io`] if the staging directory or a file cannot
    /// be read. Rejected uploads are collected in the report instead.
    pub fn upload_files(&self, dir: &Path) -> Result<FileUploadReport, UploadError> {
        let staging = dir.join(STAGING_DIR);
        let mut report = FileUploadReport::default();
        if !staging.is_dir() {
            info!(dir = %staging.display(), "No staged files");
            return Ok(report);
        }

        let files = list_files(&staging, |_| true)?;
        info!(count = files.len(), dir = %staging.display(), "Found files");

        for path in files {
            let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
                warn!(path = %path.display(), "Skipping file with non-UTF-8 name");
                continue;
            };
            let data = fs::read(&path).map_err(|source| UploadError::Io {
                path: path.clone(),
                source,
            })?;

            match self.wiki.upload_file(filename, &data) {
                Ok(UploadOutcome::Uploaded) => report.uploaded += 1,
                Ok(UploadOutcome::Unchanged) => report.unchanged += 1,
                Err(error) => {
                    warn!(file = %filename, error = %error, "Upload failed");
                    report.failed.push(FailedFile {
                        filename: filename.to_owned(),
                        error,
                    });
                }
            }
        }
        Ok(report)
    }
}

/// Regular files in `dir` matching `keep`, sorted by path.
fn list_files(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>, UploadError> {
    let io_err = |source| UploadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
