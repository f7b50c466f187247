//! Cross-check of referenced files against a page's associated files.

use std::collections::HashSet;
use std::path::Path;

/// Mismatches between the files a page references and the files it has.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct FileCheck {
    /// Referenced but not present, in first-reference order.
    pub(crate) missing: Vec<String>,
    /// Present but never referenced, in `present` order.
    pub(crate) unreferenced: Vec<String>,
}

/// Compare `linked` file names with the `present` ones.
///
/// Names with the ignored extension are left out on both sides.
pub(crate) fn cross_check(
    linked: &[String],
    present: &[String],
    ignore_extension: Option<&str>,
) -> FileCheck {
    let ignored = |name: &str| {
        ignore_extension.is_some_and(|ext| Path::new(name).extension().is_some_and(|e| e == ext))
    };

    let present_set: HashSet<&str> = present.iter().map(String::as_str).collect();
    let linked_set: HashSet<&str> = linked.iter().map(String::as_str).collect();

    let mut seen = HashSet::new();
    let missing = linked
        .iter()
        .filter(|name| !ignored(name.as_str()) && !present_set.contains(name.as_str()))
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect();

    let unreferenced = present
        .iter()
        .filter(|name| !ignored(name.as_str()) && !linked_set.contains(name.as_str()))
        .cloned()
        .collect();

    FileCheck {
        missing,
        unreferenced,
    }
}
