//! Code block protection and restoration.
//!
//! `[[code]]` blocks are swapped for opaque placeholders before any rewrite
//! rule runs, so no rule can match text inside them. Once every directive has
//! been converted, the placeholders are swapped back for `<pre>` blocks.
//!
//! Restoration does not splice the code back into one string. It yields a list
//! of [`Span`]s instead, which lets post-processing rewrite the surrounding text
//! while leaving restored code untouched.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\[\[code(?:\s+type="([^"]*)")?\s*\]\](.*?)\[\[/code\]\]"#)
        .expect("invalid code block regex")
});

const PLACEHOLDER_PREFIX: &str = "WD2MWCODE";

/// A `[[code]]` block lifted out of the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlock {
    /// Token standing in for the block while the document is rewritten.
    pub placeholder: String,
    /// Raw text between `[[code]]` and `[[/code]]`.
    pub source: String,
    /// Value of the `type` attribute, if any. Not reproduced in output.
    pub language: Option<String>,
}

impl CodeBlock {
    /// Render the block as non-parsed MediaWiki content.
    #[must_use]
    pub fn render(&self) -> String {
        format!("<pre>{}</pre>", self.source)
    }
}

/// Piece of a restored document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Span {
    /// Converted markup, still subject to post-processing.
    Text(String),
    /// Restored code, emitted as is.
    Verbatim(String),
}

/// Replace every code block with a fresh placeholder.
///
/// Blocks are returned in order of appearance. Each match replaces the first
/// remaining occurrence of its text, so identical blocks get distinct
/// placeholders.
pub(crate) fn protect(text: &str) -> (String, Vec<CodeBlock>) {
    let found: Vec<(String, String, Option<String>)> = CODE_PATTERN
        .captures_iter(text)
        .map(|caps| {
            (
                caps[0].to_owned(),
                caps[2].to_owned(),
                caps.get(1).map(|m| m.as_str().to_owned()),
            )
        })
        .collect();

    let mut protected = text.to_owned();
    let mut blocks = Vec::with_capacity(found.len());

    for (whole, source, language) in found {
        let placeholder = fresh_token(PLACEHOLDER_PREFIX, &protected, |candidate| {
            blocks.iter().any(|b: &CodeBlock| b.placeholder == candidate)
        });
        protected = protected.replacen(&whole, &placeholder, 1);
        blocks.push(CodeBlock {
            placeholder,
            source,
            language,
        });
    }

    (protected, blocks)
}

/// Generate a `prefix`ed token absent from `text` and not yet `issued`.
pub(crate) fn fresh_token(
    prefix: &str,
    text: &str,
    mut issued: impl FnMut(&str) -> bool,
) -> String {
    loop {
        let candidate = format!("{prefix}{}", Uuid::new_v4().simple());
        if !text.contains(&candidate) && !issued(&candidate) {
            return candidate;
        }
    }
}

/// Split `text` at each placeholder, in block order, into text and code spans.
pub(crate) fn restore(text: &str, blocks: &[CodeBlock]) -> Vec<Span> {
    let mut spans = Vec::with_capacity(blocks.len() * 2 + 1);
    let mut rest = text;

    for block in blocks {
        let Some(pos) = rest.find(&block.placeholder) else {
            tracing::warn!(
                placeholder = %block.placeholder,
                "Code block placeholder not found, block dropped"
            );
            continue;
        };
        spans.push(Span::Text(rest[..pos].to_owned()));
        spans.push(Span::Verbatim(block.render()));
        rest = &rest[pos + block.placeholder.len()..];
    }

    spans.push(Span::Text(rest.to_owned()));
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protect_without_code() {
        let (text, blocks) = protect("plain **text**");
        assert_eq!(text, "plain **text**");
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_protect_replaces_block() {
        let (text, blocks) = protect("before\n[[code]]\nx = //y//\n[[/code]]\nafter");

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].source, "\nx = //y//\n");
        assert_eq!(blocks[0].language, None);
        assert_eq!(text, format!("before\n{}\nafter", blocks[0].placeholder));
        assert!(!text.contains("//y//"));
    }

    #[test]
    fn test_protect_captures_language() {
        let (_, blocks) = protect("[[code type=\"python\"]]\nprint(1)\n[[/code]]");
        assert_eq!(blocks[0].language.as_deref(), Some("python"));
        assert_eq!(blocks[0].source, "\nprint(1)\n");
    }

    #[test]
    fn test_protect_is_non_greedy() {
        let (text, blocks) = protect("[[code]]a[[/code]] middle [[code]]b[[/code]]");

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].source, "a");
        assert_eq!(blocks[1].source, "b");
        assert!(text.contains(" middle "));
    }

    #[test]
    fn test_protect_identical_blocks_get_distinct_placeholders() {
        let (text, blocks) = protect("[[code]]same[[/code]]\n[[code]]same[[/code]]");

        assert_eq!(blocks.len(), 2);
        assert_ne!(blocks[0].placeholder, blocks[1].placeholder);
        assert_eq!(
            text,
            format!("{}\n{}", blocks[0].placeholder, blocks[1].placeholder)
        );
    }

    #[test]
    fn test_placeholder_absent_from_document() {
        let text = "WD2MWCODE literal and WD2MWCODE0123456789abcdef0123456789abcdef\n\
                    [[code]]x[[/code]]";
        let (protected, blocks) = protect(text);

        assert!(!text.contains(&blocks[0].placeholder));
        assert_eq!(protected.matches(&blocks[0].placeholder).count(), 1);
        assert!(protected.starts_with("WD2MWCODE literal and WD2MWCODE0123456789abcdef"));
    }

    #[test]
    fn test_fresh_token_retries_on_collision() {
        let mut calls = 0;
        let token = fresh_token("T", "", |_| {
            calls += 1;
            calls < 3
        });

        assert_eq!(calls, 3);
        assert!(token.starts_with('T'));
        assert_eq!(token.len(), 33);
    }

    #[test]
    fn test_render_wraps_in_pre() {
        let block = CodeBlock {
            placeholder: "X".to_owned(),
            source: "\nfn main() {}\n".to_owned(),
            language: Some("rust".to_owned()),
        };
        assert_eq!(block.render(), "<pre>\nfn main() {}\n</pre>");
    }

    #[test]
    fn test_restore_splits_in_order() {
        let (text, blocks) = protect("a [[code]]one[[/code]] b [[code]]two[[/code]] c");
        let spans = restore(&text, &blocks);

        assert_eq!(
            spans,
            vec![
                Span::Text("a ".to_owned()),
                Span::Verbatim("<pre>one</pre>".to_owned()),
                Span::Text(" b ".to_owned()),
                Span::Verbatim("<pre>two</pre>".to_owned()),
                Span::Text(" c".to_owned()),
            ]
        );
    }

    #[test]
    fn test_restore_skips_missing_placeholder() {
        let block = CodeBlock {
            placeholder: "WD2MWCODEmissing".to_owned(),
            source: "x".to_owned(),
            language: None,
        };
        let spans = restore("no placeholder here", &[block]);
        assert_eq!(spans, vec![Span::Text("no placeholder here".to_owned())]);
    }
}
