//! The conversion pipeline.

use crate::code_block::{self, Span};
use crate::error::ConvertError;
use crate::links::{self, LinkResolver, PageNames};
use crate::{inline, media, post, tables};

/// Directive deleted outright; MediaWiki builds its own table of contents.
const TOC_DIRECTIVE: &str = "[[toc]]";

/// Result of converting one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversionResult {
    /// Converted MediaWiki markup.
    pub text: String,
    /// Title of every internal link target, in source order, with duplicates.
    pub internal_links: Vec<String>,
    /// Unprefixed name of every referenced file, in source order, with duplicates.
    pub linked_files: Vec<String>,
}

/// Wikidot to MediaWiki markup converter.
///
/// Holds only immutable configuration, so one instance can convert any number
/// of documents, from any number of threads.
///
/// # Example
///
/// ```
/// use wd2mw_markup::{Converter, PageNames};
///
/// let converter = Converter::new();
/// let result = converter
///     .convert("+ Intro\n**bold** [[[other page]]]", "", &PageNames::new())
///     .unwrap();
///
/// assert_eq!(result.text, "= Intro =\n'''bold''' [[other page]]");
/// assert_eq!(result.internal_links, vec!["other page"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Converter {
    replacements: Vec<(String, String)>,
}

impl Converter {
    /// Create a converter with no literal replacements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal replacement applied to the document before any rewrite
    /// rule. Replacements run in the order they were added.
    #[must_use]
    pub fn with_replacement(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let (from, to) = (from.into(), to.into());
        if from.is_empty() {
            tracing::warn!(to = %to, "Ignoring replacement with empty pattern");
            return self;
        }
        self.replacements.push((from, to));
        self
    }

    /// Convert one document.
    ///
    /// `file_prefix` is prepended to every filename emitted in markup and
    /// `pages` maps page fullnames to titles for link resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::MalformedTable`] if a pipe table contains a
    /// line that is not a table row.
    pub fn convert(
        &self,
        text: &str,
        file_prefix: &str,
        pages: &PageNames,
    ) -> Result<ConversionResult, ConvertError> {
        let mut internal_links = Vec::new();
        let mut linked_files = Vec::new();
        let mut held_links = Vec::new();

        // Line-anchored rules expect every line to be preceded by a newline.
        let text = format!("\n{}\n", text.replace("\r\n", "\n"));

        let (text, blocks) = code_block::protect(&text);
        let text = self.replace_literals(text);
        let text = inline::apply(&text);
        let text = LinkResolver::new(pages).apply(&text, &mut internal_links, &mut held_links);
        let text = media::apply(&text, file_prefix, &mut linked_files);
        let text = tables::apply(&text);
        let text = links::release(&text, &held_links);
        let spans = code_block::restore(&text, &blocks);

        let mut out = String::with_capacity(text.len());
        // The wrapping newline makes line 1 of the document the second line.
        let mut line = 0;
        for span in spans {
            match span {
                Span::Text(text) => {
                    let at_line_start = out.is_empty() || out.ends_with('\n');
                    out.push_str(&post::apply(&text, line, at_line_start)?);
                    line += text.matches('\n').count();
                }
                Span::Verbatim(code) => {
                    out.push_str(&code);
                    line += code.matches('\n').count();
                }
            }
        }

        Ok(ConversionResult {
            text: out.trim().to_owned(),
            internal_links,
            linked_files,
        })
    }

    fn replace_literals(&self, text: String) -> String {
        let mut text = text.replace(TOC_DIRECTIVE, "");
        for (from, to) in &self.replacements {
            text = text.replace(from.as_str(), to);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn convert(text: &str) -> ConversionResult {
        Converter::new()
            .convert(text, "", &PageNames::new())
            .unwrap()
    }

    fn convert_with_prefix(text: &str, prefix: &str) -> ConversionResult {
        Converter::new()
            .convert(text, prefix, &PageNames::new())
            .unwrap()
    }

    #[test]
    fn test_converter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Converter>();
    }

    #[test]
    fn test_plain_text_unchanged() {
        let text = "Just a paragraph.\n\nAnd another one, with punctuation: done.";
        let result = convert(text);
        assert_eq!(result.text, text);
        assert!(result.internal_links.is_empty());
        assert!(result.linked_files.is_empty());
    }

    #[test]
    fn test_internal_link() {
        let result = convert("a link to an [[[internal page]]]");
        assert_eq!(result.text, "a link to an [[internal page]]");
        assert_eq!(result.internal_links, vec!["internal page"]);
    }

    #[test]
    fn test_two_links_in_source_order() {
        let result = convert("[[[second]]] then\n[[[first]]]");
        assert_eq!(result.internal_links, vec!["second", "first"]);
    }

    #[test]
    fn test_resolved_link_uses_title() {
        let pages: PageNames = [("start-here".to_owned(), "Start Here".to_owned())].into();
        let result = Converter::new()
            .convert("see [[[start_here|the intro]]]", "", &pages)
            .unwrap();
        assert_eq!(result.text, "see [[Start Here|the intro]]");
        assert_eq!(result.internal_links, vec!["Start Here"]);
    }

    #[test]
    fn test_links_named_like_table_directives() {
        for target in ["table of results", "row", "cell", "hcell", "/table"] {
            let result = convert_with_prefix(&format!("see [[[{target}]]]"), "p-");
            assert_eq!(result.text, format!("see [[{target}]]"));
            assert_eq!(result.internal_links, vec![target]);
        }
    }

    #[test]
    fn test_links_named_like_media_directives() {
        for target in ["file formats", "image gallery", "gallery", "=image map.png"] {
            let result = convert_with_prefix(&format!("[[[{target}]]]"), "p-");
            assert_eq!(result.text, format!("[[{target}]]"));
            assert!(result.linked_files.is_empty());
        }
    }

    #[test]
    fn test_image_size_medium() {
        let result = convert(r#"[[image filename.png size="medium"]]"#);
        assert_eq!(result.text, "[[File:filename.png|500px]]");
        assert_eq!(result.linked_files, vec!["filename.png"]);
    }

    #[test]
    fn test_file_prefix_applied_once() {
        let result = convert_with_prefix("[[file notes.txt]]\n[[=image map.png]]", "site-page-");
        assert_eq!(
            result.text,
            "[[Media:site-page-notes.txt|site-page-notes.txt]]\n[[File:site-page-map.png|center]]"
        );
        assert_eq!(result.linked_files, vec!["notes.txt", "map.png"]);
    }

    #[test]
    fn test_file_with_label_and_prose() {
        let result = convert("[[file filename|Here]] and the file filename in prose");
        assert_eq!(result.text, "[[Media:filename|Here]] and the file filename in prose");
        assert_eq!(result.linked_files, vec!["filename"]);
    }

    #[test]
    fn test_gallery() {
        let text = "[[gallery]]\n: a.png link=\"x\"\n: b.png title=\"y\"\n[[/gallery]]";
        let result = convert_with_prefix(text, "p-");
        assert_eq!(result.text, "<gallery>\np-a.png\np-b.png\n</gallery>");
        assert_eq!(result.linked_files, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_superscript() {
        assert_eq!(convert("2^^nd^^ place").text, "2<sup>nd</sup> place");
    }

    #[test]
    fn test_heading_depth() {
        let result = convert("+++ Deep heading\nbody");
        assert_eq!(result.text, "=== Deep heading ===\nbody");
    }

    #[test]
    fn test_heading_on_first_line() {
        assert_eq!(convert("+ Top").text, "= Top =");
    }

    #[test]
    fn test_italic_at_document_start() {
        assert_eq!(convert("//lean// text").text, "''lean'' text");
    }

    #[test]
    fn test_url_scheme_untouched() {
        let text = "see http://example.com/path and https://example.org//x";
        assert_eq!(convert(text).text, text);
    }

    #[test]
    fn test_code_block_untouched() {
        let text = "+ Example\n\
                    [[code type=\"python\"]]\n\
                    + not a heading\n\
                    x = \"//not italic//\" # **not bold**\n\
                    [[[not a link]]]\n\
                    || not | a table ||\n\
                    ##red|not colour##\n\n\n\n\
                    [[/code]]\n\
                    after";
        let result = convert(text);

        assert_eq!(
            result.text,
            "= Example =\n\
             <pre>\n\
             + not a heading\n\
             x = \"//not italic//\" # **not bold**\n\
             [[[not a link]]]\n\
             || not | a table ||\n\
             ##red|not colour##\n\n\n\n\
             </pre>\n\
             after"
        );
        assert!(result.internal_links.is_empty());
    }

    #[test]
    fn test_identical_code_blocks_both_restored() {
        let result = convert("[[code]]x[[/code]]\n\n[[code]]x[[/code]]");
        assert_eq!(result.text, "<pre>x</pre>\n\n<pre>x</pre>");
    }

    #[test]
    fn test_pipe_table() {
        let text = "Scores:\n\n||~ Name ||~ Score ||\n|| Ann || 10 ||\n\nDone.";
        assert_eq!(
            convert(text).text,
            "Scores:\n\n{| class=\"wikitable\"\n! Name !! Score\n|-\n| Ann || 10\n|}\n\nDone."
        );
    }

    #[test]
    fn test_pipe_table_after_code_block() {
        let text = "[[code]]c[[/code]]\n|| a ||";
        assert_eq!(
            convert(text).text,
            "<pre>c</pre>\n{| class=\"wikitable\"\n| a\n|}"
        );
    }

    #[test]
    fn test_malformed_pipe_table_fails() {
        let text = "intro\n|| a || b ||\nnot a row\n|| c || d ||";
        let err = Converter::new()
            .convert(text, "", &PageNames::new())
            .unwrap_err();
        assert_eq!(
            err,
            ConvertError::MalformedTable {
                line: 3,
                content: "not a row".to_owned(),
            }
        );
    }

    #[test]
    fn test_malformed_table_line_counts_code_lines() {
        let text = "[[code]]\na\nb\n[[/code]]\n|| x ||\noops";
        let err = Converter::new()
            .convert(text, "", &PageNames::new())
            .unwrap_err();
        assert_eq!(
            err,
            ConvertError::MalformedTable {
                line: 6,
                content: "oops".to_owned(),
            }
        );
    }

    #[test]
    fn test_empty_pipe_table_row() {
        assert_eq!(
            convert("|| a ||\n||").text,
            "{| class=\"wikitable\"\n| a\n|-\n\n|}"
        );
        assert_eq!(
            convert("|| a ||\n||   ").text,
            "{| class=\"wikitable\"\n| a\n|-\n\n|}"
        );
    }

    #[test]
    fn test_tag_table() {
        let text = "[[table]]\n[[row]]\n[[cell]]\nA\n[[/cell]]\n[[/row]]\n[[/table]]";
        assert_eq!(convert(text).text, "{|\n|-\n|\nA\n\n|}");
    }

    #[test]
    fn test_color_and_math() {
        let result = convert("##blue|sky## and [[$ a^2 $]]");
        assert_eq!(
            result.text,
            r#"<span style="color:blue">sky</span> and <math> a^2 </math>"#
        );
    }

    #[test]
    fn test_toc_removed_and_replacements_applied() {
        let result = Converter::new()
            .with_replacement("@@OLD@@", "new")
            .with_replacement("", "ignored")
            .convert("[[toc]]\n\n\n\nsee @@OLD@@ here", "", &PageNames::new())
            .unwrap();
        assert_eq!(result.text, "see new here");
    }

    #[test]
    fn test_crlf_normalized() {
        let result = convert("+ Title\r\n* item\r\n");
        assert_eq!(result.text, "= Title =\n* item");
    }

    #[test]
    fn test_blank_lines_collapsed_and_trimmed() {
        assert_eq!(convert("\n\n  a\n\n\n\n\nb  \n\n").text, "a\n\nb");
    }

    #[test]
    fn test_nested_list_indentation() {
        let result = convert("* one\n * two\n  # three");
        assert_eq!(result.text, "* one\n** two\n**# three");
    }
}
