//! Upload staging of associated files.
//!
//! All pages' files share one staging directory, so every file is staged
//! under its page's file prefix. Staging the same bytes twice is a no-op;
//! staging different bytes under a name already taken is an error, never an
//! overwrite.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StagingError;

/// Name of the staging directory inside the output directory.
pub const STAGING_DIR: &str = "files_to_upload";

/// What staging a file did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    /// The file was copied into the staging directory.
    Copied,
    /// An identical file was already staged.
    AlreadyStaged,
}

/// Copies files into the staging directory.
pub(crate) struct Stager {
    dir: PathBuf,
}

impl Stager {
    /// Create the staging directory if needed.
    pub(crate) fn create(dir: PathBuf) -> Result<Self, StagingError> {
        fs::create_dir_all(&dir).map_err(|source| StagingError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Stage `source` as `staged_name`.
    pub(crate) fn stage(
        &self,
        source: &Path,
        staged_name: &str,
    ) -> Result<StageOutcome, StagingError> {
        let staged = self.dir.join(staged_name);

        if staged.exists() {
            if read(&staged)? == read(source)? {
                tracing::debug!(file = %staged.display(), "Identical file already staged");
                return Ok(StageOutcome::AlreadyStaged);
            }
            return Err(StagingError::Collision {
                staged,
                source_path: source.to_path_buf(),
            });
        }

        fs::copy(source, &staged).map_err(|e| StagingError::Io {
            path: staged.clone(),
            source: e,
        })?;
        Ok(StageOutcome::Copied)
    }
}

fn read(path: &Path) -> Result<Vec<u8>, StagingError> {
    fs::read(path).map_err(|source| StagingError::Io {
        path: path.to_path_buf(),
        source,
    })
}
