//! Inline styles, comments, headings and list markers.
//!
//! Every rule is a whole-document regex substitution. The rules run in the
//! order of [`apply`]; later rules see the output of earlier ones.

use std::sync::LazyLock;

use regex::{Captures, Regex};

// A non-colon character must precede each delimiter pair so that `http://`
// and similar scheme separators are left alone.
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^:])//([^\n]*?[^:\n])//").expect("invalid italic regex"));

static BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^:])\*\*([^\n]*?[^:\n])\*\*").expect("invalid bold regex")
});

static UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^:])__([^\n]*?[^:\n])__").expect("invalid underline regex"));

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[!--(.*?)--\]").expect("invalid comment regex"));

static SUPERSCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\^\^([^\n]*?)\^\^").expect("invalid superscript regex"));

static SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[size\b[^\]]*\]\]|\[\[/size\]\]").expect("invalid size regex")
});

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(\++)[ \t]+(\S[^\n]*?)[ \t]*$").expect("invalid heading regex")
});

static LIST_INDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]+)([*#])").expect("invalid list regex"));

/// Apply all inline rules in order.
pub(crate) fn apply(text: &str) -> String {
    let text = ITALIC.replace_all(text, "${1}''${2}''");
    let text = BOLD.replace_all(&text, "${1}'''${2}'''");
    // MediaWiki has no underline markup; underlined runs become bold.
    let text = UNDERLINE.replace_all(&text, "${1}'''${2}'''");
    let text = COMMENT.replace_all(&text, "<!--${1}-->");
    let text = SUPERSCRIPT.replace_all(&text, "<sup>${1}</sup>");
    let text = SIZE.replace_all(&text, "");
    let text = HEADING.replace_all(&text, |caps: &Captures| {
        let marker = "=".repeat(caps[1].len());
        format!("{marker} {} {marker}", &caps[2])
    });
    // Indented `#` items get the same `*` depth prefix as bullets.
    let text = LIST_INDENT.replace_all(&text, |caps: &Captures| {
        format!("{}{}", "*".repeat(caps[1].len()), &caps[2])
    });
    text.into_owned()
}
