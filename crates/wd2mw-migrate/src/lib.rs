//! Batch migration of a Wikidot site backup.
//!
//! Reads a backup laid out as
//!
//! ```text
//! source/<fullname>.txt    page bodies
//! meta/<fullname>.xml      page metadata (fullname and title)
//! files/<fullname>/...     files attached to each page
//! ```
//!
//! converts every page with [`wd2mw_markup::Converter`] and writes
//!
//! ```text
//! <output>/<title>.mktxt                     one converted page per title
//! <output>/files_to_upload/<prefix><name>    attached files, prefixed per page
//! <output>/<index title>.mktxt               index of all pages, orphans flagged
//! ```
//!
//! The output directory is what `wd2mw upload` consumes.

mod error;
mod files;
mod metadata;
mod migrator;
mod report;
mod scanner;
mod staging;

pub use error::{MetadataError, MigrateError, PageError, StagingError};
pub use metadata::PageMeta;
pub use migrator::{Migrator, PAGE_EXTENSION, page_filename};
pub use report::{FailedPage, FileIssue, MigrationReport};
pub use scanner::{DocumentRef, Scanner, file_prefix};
pub use staging::{STAGING_DIR, StageOutcome};
