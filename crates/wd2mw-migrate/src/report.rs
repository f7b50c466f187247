//! Migration report and the generated index page.

use std::collections::HashSet;
use std::fmt::Write;

/// A page that could not be migrated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedPage {
    /// Page fullname.
    pub fullname: String,
    /// Error description.
    pub error: String,
}

/// A file mismatch found by the cross-check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileIssue {
    /// Fullname of the page the file belongs to.
    pub page: String,
    /// Unprefixed file name.
    pub filename: String,
}

/// Outcome of a migration run.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Titles of converted pages, in fullname order.
    pub converted: Vec<String>,
    /// Pages that failed, in fullname order.
    pub failed: Vec<FailedPage>,
    /// Files referenced by a page but absent from its files directory.
    pub missing_files: Vec<FileIssue>,
    /// Files in a page's files directory that the page never references.
    pub unreferenced_files: Vec<FileIssue>,
    /// Titles of converted pages no other page links to, sorted.
    pub orphans: Vec<String>,
    /// Number of files newly copied to the staging directory.
    pub staged_files: usize,
}

impl MigrationReport {
    /// Whether any page failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub(crate) fn record_failure(&mut self, fullname: &str, error: &dyn std::error::Error) {
        tracing::warn!(page = %fullname, error = %error, "Page failed");
        self.failed.push(FailedPage {
            fullname: fullname.to_owned(),
            error: error.to_string(),
        });
    }
}

/// Titles that no page other than themselves links to, sorted.
///
/// `pages` pairs each page title with the titles it links to.
pub(crate) fn find_orphans<'a>(pages: &[(&'a str, &'a [String])]) -> Vec<String> {
    let linked: HashSet<&str> = pages
        .iter()
        .flat_map(|(title, links)| {
            links
                .iter()
                .map(String::as_str)
                .filter(move |target| target != title)
        })
        .collect();

    let mut orphans: Vec<String> = pages
        .iter()
        .map(|(title, _)| *title)
        .filter(|title| !linked.contains(title))
        .map(str::to_owned)
        .collect();
    orphans.sort();
    orphans.dedup();
    orphans
}

/// Render the index page listing every migrated page.
pub(crate) fn render_index(report: &MigrationReport) -> String {
    let orphans: HashSet<&str> = report.orphans.iter().map(String::as_str).collect();
    let mut titles: Vec<&str> = report.converted.iter().map(String::as_str).collect();
    titles.sort_unstable();
    titles.dedup();

    let mut out = String::from("Pages migrated from Wikidot.\n\n== Pages ==\n");
    for title in &titles {
        let _ = write!(out, "* [[{title}]]");
        if orphans.contains(title) {
            out.push_str(" (orphaned)");
        }
        out.push('\n');
    }

    if !report.orphans.is_empty() {
        out.push_str("\n== Orphaned pages ==\n");
        for title in &report.orphans {
            let _ = writeln!(out, "* [[{title}]]");
        }
    }

    if !report.failed.is_empty() {
        out.push_str("\n== Failed pages ==\n");
        for page in &report.failed {
            let _ = writeln!(
                out,
                "* <code>{}</code>: <nowiki>{}</nowiki>",
                page.fullname, page.error
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_find_orphans() {
        let home = links(&["Guide", "Home"]);
        let guide = links(&["Home"]);
        let lonely = links(&["Lonely", "Nowhere"]);
        let pages = [
            ("Home", home.as_slice()),
            ("Guide", guide.as_slice()),
            ("Lonely", lonely.as_slice()),
        ];

        // A self-link does not rescue a page.
        assert_eq!(find_orphans(&pages), vec!["Lonely"]);
    }

    #[test]
    fn test_render_index() {
        let report = MigrationReport {
            converted: links(&["Zebra", "Apple", "Mango"]),
            orphans: links(&["Mango"]),
            ..MigrationReport::default()
        };

        assert_eq!(
            render_index(&report),
            "Pages migrated from Wikidot.\n\n\
             == Pages ==\n\
             * [[Apple]]\n\
             * [[Mango]] (orphaned)\n\
             * [[Zebra]]\n\
             \n\
             == Orphaned pages ==\n\
             * [[Mango]]\n"
        );
    }

    #[test]
    fn test_render_index_lists_failures() {
        let report = MigrationReport {
            converted: links(&["Home"]),
            failed: vec![FailedPage {
                fullname: "broken".to_owned(),
                error: "malformed table at line 3".to_owned(),
            }],
            ..MigrationReport::default()
        };

        let index = render_index(&report);

        assert!(!index.contains("Orphaned"));
        assert!(index.ends_with(
            "== Failed pages ==\n* <code>broken</code>: <nowiki>malformed table at line 3</nowiki>\n"
        ));
    }

    #[test]
    fn test_has_failures() {
        let mut report = MigrationReport::default();
        assert!(!report.has_failures());
        report.record_failure("x", &std::io::Error::other("boom"));
        assert!(report.has_failures());
        assert_eq!(report.failed[0].error, "boom");
    }
}
