//! Batch migration of a Wikidot backup.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rayon::prelude::*;
use wd2mw_config::ConvertConfig;
use wd2mw_markup::{ConversionResult, Converter, PageNames};

use crate::error::{MigrateError, PageError};
use crate::files::cross_check;
use crate::metadata::PageMeta;
use crate::report::{FileIssue, MigrationReport, find_orphans, render_index};
use crate::scanner::{DocumentRef, Scanner, list_files};
use crate::staging::{STAGING_DIR, StageOutcome, Stager};

/// Extension of converted page files.
pub const PAGE_EXTENSION: &str = "mktxt";

/// File name of a converted page; `/` is not allowed in file names.
#[must_use]
pub fn page_filename(title: &str) -> String {
    format!("{}.{PAGE_EXTENSION}", title.replace('/', "-"))
}

/// A page whose title is known.
struct Page {
    doc: DocumentRef,
    title: String,
}

/// Converts every page of a backup and prepares the output directory.
///
/// Pages are converted in parallel. A page that fails to read or convert is
/// recorded in the report and the batch carries on; a staging collision
/// aborts the run.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use wd2mw_config::Config;
/// use wd2mw_migrate::Migrator;
///
/// let config = Config::load(None, None)?;
/// let report = Migrator::new(&config.convert_resolved).run()?;
/// println!("{} pages converted", report.converted.len());
/// # Ok(())
/// # }
/// ```
pub struct Migrator<'a> {
    config: &'a ConvertConfig,
    converter: Converter,
}

impl<'a> Migrator<'a> {
    /// Create a migrator; configured replacements are applied to every page.
    #[must_use]
    pub fn new(config: &'a ConvertConfig) -> Self {
        let converter = config
            .replacements
            .iter()
            .fold(Converter::new(), |converter, r| {
                converter.with_replacement(r.from.as_str(), r.to.as_str())
            });
        Self { config, converter }
    }

    /// Run the migration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup cannot be scanned, the output cannot be
    /// written, or two different files would be staged under one name.
    pub fn run(&self) -> Result<MigrationReport, MigrateError> {
        let docs = Scanner::new(&self.config.source_dir).scan()?;
        tracing::info!(
            pages = docs.len(),
            source = %self.config.source_dir.display(),
            "Found pages"
        );

        let mut report = MigrationReport::default();
        let mut pages = Vec::with_capacity(docs.len());
        for doc in docs {
            match load_title(&doc) {
                Ok(title) => pages.push(Page { doc, title }),
                Err(e) => report.record_failure(&doc.fullname, &e),
            }
        }

        let names: PageNames = pages
            .iter()
            .map(|p| (p.doc.fullname.clone(), p.title.clone()))
            .collect();

        let results: Vec<Result<ConversionResult, PageError>> = pages
            .par_iter()
            .map(|page| self.convert_page(&page.doc, &names))
            .collect();

        let mut converted = Vec::with_capacity(pages.len());
        for (page, result) in pages.iter().zip(results) {
            match result {
                Ok(result) => converted.push((page, result)),
                Err(e) => report.record_failure(&page.doc.fullname, &e),
            }
        }

        let output_dir = &self.config.output_dir;
        create_dir(output_dir)?;
        let stager = Stager::create(output_dir.join(STAGING_DIR))?;
        let mut written = HashSet::new();

        for (page, result) in &converted {
            let filename = page_filename(&page.title);
            if !written.insert(filename.clone()) {
                tracing::warn!(
                    page = %page.doc.fullname,
                    file = %filename,
                    "Duplicate page title, overwriting"
                );
            }
            write_file(&output_dir.join(&filename), &result.text)?;
            report.converted.push(page.title.clone());

            self.process_files(page, result, &stager, &mut report)?;
        }

        let link_table: Vec<(&str, &[String])> = converted
            .iter()
            .map(|(page, result)| (page.title.as_str(), result.internal_links.as_slice()))
            .collect();
        report.orphans = find_orphans(&link_table);

        let index_file = page_filename(&self.config.index_title);
        if written.contains(&index_file) {
            tracing::warn!(file = %index_file, "Index page replaces a converted page");
        }
        write_file(&output_dir.join(index_file), &render_index(&report))?;

        tracing::info!(
            converted = report.converted.len(),
            failed = report.failed.len(),
            staged = report.staged_files,
            "Migration finished"
        );
        Ok(report)
    }

    fn convert_page(
        &self,
        doc: &DocumentRef,
        names: &PageNames,
    ) -> Result<ConversionResult, PageError> {
        let text = fs::read_to_string(&doc.content_path).map_err(|source| PageError::Read {
            path: doc.content_path.clone(),
            source,
        })?;
        let result = self.converter.convert(&text, &doc.file_prefix(), names)?;
        tracing::debug!(page = %doc.fullname, "Converted page");
        Ok(result)
    }

    /// Cross-check and stage one page's associated files.
    fn process_files(
        &self,
        page: &Page,
        result: &ConversionResult,
        stager: &Stager,
        report: &mut MigrationReport,
    ) -> Result<(), MigrateError> {
        let fullname = &page.doc.fullname;
        let present = match &page.doc.files_dir {
            Some(dir) => list_files(dir).map_err(|source| MigrateError::Io {
                path: dir.clone(),
                source,
            })?,
            None => Vec::new(),
        };

        let check = cross_check(
            &result.linked_files,
            &present,
            self.config.ignore_extension.as_deref(),
        );
        for filename in check.missing {
            tracing::warn!(page = %fullname, file = %filename, "Referenced file not found");
            report.missing_files.push(FileIssue {
                page: fullname.clone(),
                filename,
            });
        }
        for filename in check.unreferenced {
            tracing::warn!(page = %fullname, file = %filename, "File not referenced by page");
            report.unreferenced_files.push(FileIssue {
                page: fullname.clone(),
                filename,
            });
        }

        let Some(dir) = &page.doc.files_dir else {
            return Ok(());
        };
        let prefix = page.doc.file_prefix();
        for name in &present {
            let staged_name = format!("{prefix}{name}");
            if stager.stage(&dir.join(name), &staged_name)? == StageOutcome::Copied {
                report.staged_files += 1;
            }
        }
        Ok(())
    }
}

/// Title from the page's metadata, or its fullname if there is none.
fn load_title(doc: &DocumentRef) -> Result<String, PageError> {
    let Some(meta_path) = &doc.meta_path else {
        tracing::debug!(page = %doc.fullname, "No metadata, using fullname as title");
        return Ok(doc.fullname.clone());
    };

    let xml = fs::read_to_string(meta_path).map_err(|source| PageError::Read {
        path: meta_path.clone(),
        source,
    })?;
    let meta = PageMeta::from_xml(&xml).map_err(|source| PageError::Metadata {
        path: meta_path.clone(),
        source,
    })?;

    if meta.fullname != doc.fullname {
        tracing::warn!(
            page = %doc.fullname,
            recorded = %meta.fullname,
            "Metadata fullname differs from file name"
        );
    }
    if meta.title.is_empty() {
        return Ok(doc.fullname.clone());
    }
    Ok(meta.title)
}

fn create_dir(path: &Path) -> Result<(), MigrateError> {
    fs::create_dir_all(path).map_err(|source| MigrateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), MigrateError> {
    fs::write(path, content).map_err(|source| MigrateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use wd2mw_config::Replacement;

    use super::*;
    use crate::error::StagingError;
    use crate::report::FailedPage;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn meta(fullname: &str, title: &str) -> String {
        format!("<page><data><fullname>{fullname}</fullname><title>{title}</title></data></page>")
    }

    fn config(root: &Path) -> ConvertConfig {
        ConvertConfig {
            source_dir: root.join("backup"),
            output_dir: root.join("out"),
            ..ConvertConfig::default()
        }
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_page_filename() {
        assert_eq!(page_filename("Start"), "Start.mktxt");
        assert_eq!(page_filename("A/B testing"), "A-B testing.mktxt");
    }

    #[test]
    fn test_run_converts_links_and_stages_files() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backup");
        write(
            &backup.join("source/start.txt"),
            "+ Welcome\nSee [[[how_to]]].\n[[image logo.png]]",
        );
        write(&backup.join("meta/start.xml"), &meta("start", "Welcome"));
        write(&backup.join("files/start/logo.png"), "png");
        write(&backup.join("files/start/unused.pdf"), "pdf");
        write(&backup.join("source/how-to.txt"), "[[[start|Back]]] [[file guide.pdf]]");
        write(&backup.join("meta/how-to.xml"), &meta("how-to", "How To"));

        let config = config(dir.path());
        let report = Migrator::new(&config).run().unwrap();

        let out = dir.path().join("out");
        assert_eq!(
            read(out.join("Welcome.mktxt")),
            "= Welcome =\nSee [[How To]].\n[[File:start-logo.png]]"
        );
        assert_eq!(
            read(out.join("How To.mktxt")),
            "[[Welcome|Back]] [[Media:how-to-guide.pdf|how-to-guide.pdf]]"
        );
        assert_eq!(read(out.join("files_to_upload/start-logo.png")), "png");
        assert_eq!(read(out.join("files_to_upload/start-unused.pdf")), "pdf");

        assert_eq!(report.converted, vec!["How To", "Welcome"]);
        assert!(report.failed.is_empty());
        assert!(report.orphans.is_empty());
        assert_eq!(report.staged_files, 2);
        assert_eq!(
            report.missing_files,
            vec![FileIssue {
                page: "how-to".to_owned(),
                filename: "guide.pdf".to_owned(),
            }]
        );
        assert_eq!(
            report.unreferenced_files,
            vec![FileIssue {
                page: "start".to_owned(),
                filename: "unused.pdf".to_owned(),
            }]
        );
    }

    #[test]
    fn test_run_isolates_failed_page() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backup");
        write(&backup.join("source/bad.txt"), "|| a ||\nnot a row");
        write(&backup.join("source/good.txt"), "fine");

        let config = config(dir.path());
        let report = Migrator::new(&config).run().unwrap();

        assert_eq!(report.converted, vec!["good"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].fullname, "bad");
        assert!(report.failed[0].error.contains("malformed table"));
        assert!(report.has_failures());
        assert_eq!(read(dir.path().join("out/good.mktxt")), "fine");
        assert!(!dir.path().join("out/bad.mktxt").exists());
    }

    #[test]
    fn test_run_records_bad_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backup");
        write(&backup.join("source/page.txt"), "text");
        write(&backup.join("meta/page.xml"), "<page></page>");

        let config = config(dir.path());
        let report = Migrator::new(&config).run().unwrap();

        assert!(report.converted.is_empty());
        assert!(report.failed[0].error.contains("invalid metadata"));
    }

    #[test]
    fn test_run_writes_index_with_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backup");
        write(&backup.join("source/a.txt"), "[[[b]]]");
        write(&backup.join("source/b.txt"), "nothing");

        let config = ConvertConfig {
            index_title: "Site index".to_owned(),
            ..config(dir.path())
        };
        let report = Migrator::new(&config).run().unwrap();

        assert_eq!(report.orphans, vec!["a"]);
        assert_eq!(
            read(dir.path().join("out/Site index.mktxt")),
            "Pages migrated from Wikidot.\n\n\
             == Pages ==\n\
             * [[a]] (orphaned)\n\
             * [[b]]\n\
             \n\
             == Orphaned pages ==\n\
             * [[a]]\n"
        );
    }

    #[test]
    fn test_run_applies_replacements() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backup");
        write(&backup.join("source/p.txt"), "[[module Rate]]\nbody");

        let config = ConvertConfig {
            replacements: vec![Replacement {
                from: "[[module Rate]]".to_owned(),
                to: String::new(),
            }],
            ..config(dir.path())
        };
        Migrator::new(&config).run().unwrap();

        assert_eq!(read(dir.path().join("out/p.mktxt")), "body");
    }

    #[test]
    fn test_run_ignores_extension_in_cross_check() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backup");
        write(&backup.join("source/p.txt"), "text");
        write(&backup.join("files/p/thumb.tmp"), "x");

        let config = ConvertConfig {
            ignore_extension: Some("tmp".to_owned()),
            ..config(dir.path())
        };
        let report = Migrator::new(&config).run().unwrap();

        assert!(report.unreferenced_files.is_empty());
        // Ignored files are still staged.
        assert_eq!(report.staged_files, 1);
    }

    #[test]
    fn test_run_fails_on_staging_collision() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backup");
        // "a:b" and "a-b" share the file prefix "a-b-".
        write(&backup.join("source/a:b.txt"), "one");
        write(&backup.join("files/a:b/x.png"), "first");
        write(&backup.join("source/a-b.txt"), "two");
        write(&backup.join("files/a-b/x.png"), "second");

        let config = config(dir.path());
        let err = Migrator::new(&config).run().unwrap_err();

        assert!(matches!(
            err,
            MigrateError::Staging(StagingError::Collision { .. })
        ));
    }

    #[test]
    fn test_run_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let err = Migrator::new(&config).run().unwrap_err();
        assert!(matches!(err, MigrateError::SourceNotFound(_)));
    }

    #[test]
    fn test_failed_page_reported_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backup");
        write(&backup.join("source/a.txt"), "||x||\nbad");
        write(&backup.join("source/b.txt"), "||y||\nbad");

        let config = config(dir.path());
        let report = Migrator::new(&config).run().unwrap();

        let failed: Vec<&str> = report
            .failed
            .iter()
            .map(|FailedPage { fullname, .. }| fullname.as_str())
            .collect();
        assert_eq!(failed, vec!["a", "b"]);
    }
}
