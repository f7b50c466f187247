//! `[[table]]` / `[[row]]` / `[[cell]]` tag tables.
//!
//! Attributes on the tags are dropped.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static TABLE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[(/?)(table|row|cell|hcell)(?:\s[^\]]*)?\]\]")
        .expect("invalid table tag regex")
});

/// MediaWiki token for an opening or closing tag.
fn token(closing: bool, tag: &str) -> &'static str {
    match (closing, tag) {
        (false, "table") => "{|",
        (false, "row") => "|-",
        (false, "cell") => "|",
        (false, "hcell") => "!",
        (true, "table") => "|}",
        // Rows and cells need no closing token.
        _ => "",
    }
}

/// Rewrite every table tag.
pub(crate) fn apply(text: &str) -> String {
    TABLE_TAG
        .replace_all(text, |caps: &Captures| token(!caps[1].is_empty(), &caps[2]))
        .into_owned()
}
