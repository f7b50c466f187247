//! Internal page link resolution.
//!
//! Converts `[[[target]]]` and `[[[target|text]]]` into MediaWiki links to
//! the target page's title. Emitted links are held behind placeholders until
//! the media and table stages have run, since `[[Title]]` is directive syntax
//! to them.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::code_block::fresh_token;

static INTERNAL_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[\[([^\n]*?)\]\]\]").expect("invalid internal link regex"));

const PLACEHOLDER_PREFIX: &str = "WD2MWLINK";

/// Map from page fullname to page title.
pub type PageNames = HashMap<String, String>;

/// Normalize a link target the way Wikidot derives fullnames.
///
/// Underscores and `@` become hyphens and the result is lowercased.
///
/// # Example
///
/// ```
/// use wd2mw_markup::normalize_fullname;
///
/// assert_eq!(normalize_fullname("List_Of@Participants"), "list-of-participants");
/// ```
#[must_use]
pub fn normalize_fullname(target: &str) -> String {
    target.replace(['_', '@'], "-").to_lowercase()
}

/// Case-insensitive reverse index from title to canonical title.
///
/// Two titles differing only by case collapse onto one entry. Titles are
/// visited in fullname order and the first one wins, so the choice is stable.
#[derive(Debug, Default)]
pub struct PageNameIndex {
    titles: HashMap<String, String>,
}

impl PageNameIndex {
    /// Build the index from a fullname to title map.
    #[must_use]
    pub fn new(pages: &PageNames) -> Self {
        let mut entries: Vec<(&String, &String)> = pages.iter().collect();
        entries.sort_unstable();

        let mut titles = HashMap::with_capacity(entries.len());
        for (fullname, title) in entries {
            let key = title.to_lowercase();
            if let Some(existing) = titles.get(&key) {
                tracing::debug!(
                    fullname = %fullname,
                    title = %title,
                    kept = %existing,
                    "Titles differ only by case"
                );
                continue;
            }
            titles.insert(key, title.clone());
        }

        Self { titles }
    }

    /// Look up a title ignoring case.
    #[must_use]
    pub fn get(&self, title: &str) -> Option<&str> {
        self.titles.get(&title.to_lowercase()).map(String::as_str)
    }
}

/// Link markup standing outside the text behind a placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HeldLink {
    pub(crate) placeholder: String,
    pub(crate) markup: String,
}

/// Put held link markup back in place of its placeholder.
pub(crate) fn release(text: &str, held: &[HeldLink]) -> String {
    let mut text = text.to_owned();
    for link in held {
        text = text.replacen(&link.placeholder, &link.markup, 1);
    }
    text
}

/// Resolves link targets against the page-name map.
pub(crate) struct LinkResolver<'a> {
    pages: &'a PageNames,
    index: PageNameIndex,
}

impl<'a> LinkResolver<'a> {
    pub(crate) fn new(pages: &'a PageNames) -> Self {
        Self {
            pages,
            index: PageNameIndex::new(pages),
        }
    }

    /// Resolve a link target to a page title.
    ///
    /// Returns `None` when neither the fullname nor the title lookup matches.
    pub(crate) fn resolve(&self, target: &str) -> Option<&str> {
        self.pages
            .get(&normalize_fullname(target))
            .map(String::as_str)
            .or_else(|| self.index.get(target))
    }

    /// Rewrite every internal link, appending each target title to `links`.
    ///
    /// Each link is replaced by a placeholder and its markup pushed to `held`;
    /// [`release`] puts it back. Targets are trimmed before lookup, and an
    /// unresolved target is emitted as that trimmed text.
    pub(crate) fn apply(
        &self,
        text: &str,
        links: &mut Vec<String>,
        held: &mut Vec<HeldLink>,
    ) -> String {
        INTERNAL_LINK
            .replace_all(text, |caps: &Captures| {
                let (target, alt) = match caps[1].split_once('|') {
                    Some((target, alt)) => (target, Some(alt)),
                    None => (&caps[1], None),
                };
                let target = target.trim();

                let title = if let Some(title) = self.resolve(target) {
                    title
                } else {
                    tracing::warn!(target = %target, "Unresolved internal link");
                    target
                };
                links.push(title.to_owned());

                let markup = match alt {
                    Some(alt) => format!("[[{title}|{alt}]]"),
                    None => format!("[[{title}]]"),
                };
                let placeholder = fresh_token(PLACEHOLDER_PREFIX, text, |candidate| {
                    held.iter().any(|h| h.placeholder == candidate)
                });
                held.push(HeldLink {
                    placeholder: placeholder.clone(),
                    markup,
                });
                placeholder
            })
            .into_owned()
    }
}
