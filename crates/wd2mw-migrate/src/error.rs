//! Error types for the migration.

use std::path::PathBuf;

use wd2mw_markup::ConvertError;

/// Error reading a page's metadata file.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MetadataError {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// Encoding error during XML parsing.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// An element occurs a number of times other than once.
    #[error("expected exactly one <{element}> element, found {count}")]
    ElementCount {
        /// Element name.
        element: &'static str,
        /// Number of occurrences found.
        count: usize,
    },
}

/// Error copying an associated file into the upload staging directory.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    /// A different file is already staged under the same name.
    #[error("{} is already staged with different content than {}", staged.display(), source_path.display())]
    Collision {
        /// Path in the staging directory.
        staged: PathBuf,
        /// File that was about to be staged.
        source_path: PathBuf,
    },

    /// I/O error while comparing or copying.
    #[error("failed to stage {}: {source}", path.display())]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Error that fails a single page without stopping the batch.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// The page body or metadata could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The metadata file is malformed.
    #[error("invalid metadata in {}: {source}", path.display())]
    Metadata {
        /// Metadata file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: MetadataError,
    },

    /// The page body could not be converted.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Error that aborts the whole migration.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// The backup has no `source/` directory.
    #[error("Wikidot source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// I/O error outside of a single page.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Upload staging failed.
    #[error(transparent)]
    Staging(#[from] StagingError),
}
