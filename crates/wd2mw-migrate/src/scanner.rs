//! Page discovery in a Wikidot site backup.
//!
//! A backup holds one `source/<fullname>.txt` per page. Metadata and
//! associated files live beside it, under `meta/` and `files/`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MigrateError;

const SOURCE_DIR: &str = "source";
const META_DIR: &str = "meta";
const FILES_DIR: &str = "files";

/// Reference to one page's files in the backup.
///
/// No content is read at this stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentRef {
    /// Page fullname, taken from the body's file stem.
    pub fullname: String,
    /// Page body.
    pub content_path: PathBuf,
    /// Metadata file, if present.
    pub meta_path: Option<PathBuf>,
    /// Directory of associated files, if present.
    pub files_dir: Option<PathBuf>,
}

impl DocumentRef {
    /// Prefix given to this page's files in the shared upload namespace.
    #[must_use]
    pub fn file_prefix(&self) -> String {
        file_prefix(&self.fullname)
    }
}

/// File prefix for a page fullname: `:` becomes `-` and a `-` is appended.
#[must_use]
pub fn file_prefix(fullname: &str) -> String {
    format!("{}-", fullname.replace(':', "-"))
}

/// Discovers pages in a Wikidot backup directory.
pub struct Scanner {
    backup_dir: PathBuf,
}

impl Scanner {
    /// Create a scanner for the given backup directory.
    #[must_use]
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
        }
    }

    /// List every page, sorted by fullname.
    ///
    /// Hidden files and files without a `.txt` extension are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if `source/` is missing or cannot be read.
    pub fn scan(&self) -> Result<Vec<DocumentRef>, MigrateError> {
        let source_dir = self.backup_dir.join(SOURCE_DIR);
        if !source_dir.is_dir() {
            return Err(MigrateError::SourceNotFound(source_dir));
        }

        let entries = fs::read_dir(&source_dir).map_err(|source| MigrateError::Io {
            path: source_dir.clone(),
            source,
        })?;

        let mut refs: Vec<DocumentRef> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|e| self.document_ref(&e.path()))
            .collect();

        refs.sort_by(|a, b| a.fullname.cmp(&b.fullname));
        Ok(refs)
    }

    fn document_ref(&self, content_path: &Path) -> Option<DocumentRef> {
        let name = content_path.file_name()?.to_str()?;
        if name.starts_with('.') {
            return None;
        }
        let fullname = name.strip_suffix(".txt")?;

        let meta_path = self.backup_dir.join(META_DIR).join(format!("{fullname}.xml"));
        let files_dir = self.backup_dir.join(FILES_DIR).join(fullname);

        Some(DocumentRef {
            fullname: fullname.to_owned(),
            content_path: content_path.to_path_buf(),
            meta_path: meta_path.is_file().then_some(meta_path),
            files_dir: files_dir.is_dir().then_some(files_dir),
        })
    }
}

/// Names of the regular, non-hidden files directly inside `dir`, sorted.
pub(crate) fn list_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|e| e.file_name().to_str().map(str::to_owned))
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    Ok(names)
}
