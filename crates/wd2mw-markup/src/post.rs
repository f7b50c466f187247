//! Post-processing of converted text spans.
//!
//! Colour and math spans are found by explicit forward index search rather
//! than regexes: colour names and coloured text may contain anything. Each
//! scan restarts just past the end marker it consumed and stops at the first
//! marker it cannot find, so a stray start marker is left as is.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConvertError;

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("invalid blank lines regex"));

const COLOR_MARK: &str = "##";
const MATH_OPEN: &str = "[[$";
const MATH_CLOSE: &str = "$]]";

/// Post-process one text span.
///
/// `first_line` is the document line number of the span's first line and
/// `at_line_start` tells whether that line starts at the beginning of a line
/// of the document.
pub(crate) fn apply(
    text: &str,
    first_line: usize,
    at_line_start: bool,
) -> Result<String, ConvertError> {
    let text = color_spans(text);
    let text = math_spans(&text);
    let text = pipe_tables(&text, first_line, at_line_start)?;
    Ok(BLANK_LINES.replace_all(&text, "\n\n").into_owned())
}

/// Rewrite `##color|text##` as a styled span.
fn color_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    loop {
        let Some(start) = find_from(text, COLOR_MARK, pos) else {
            break;
        };
        let Some(pipe) = find_from(text, "|", start + COLOR_MARK.len()) else {
            break;
        };
        let Some(end) = find_from(text, COLOR_MARK, pipe + 1) else {
            break;
        };

        out.push_str(&text[pos..start]);
        let color = &text[start + COLOR_MARK.len()..pipe];
        let content = &text[pipe + 1..end];
        out.push_str(&format!(r#"<span style="color:{color}">{content}</span>"#));
        pos = end + COLOR_MARK.len();
    }

    out.push_str(&text[pos..]);
    out
}

/// Rewrite `[[$ expr $]]` as a `<math>` element.
fn math_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    loop {
        let Some(start) = find_from(text, MATH_OPEN, pos) else {
            break;
        };
        let Some(end) = find_from(text, MATH_CLOSE, start + MATH_OPEN.len()) else {
            break;
        };

        out.push_str(&text[pos..start]);
        out.push_str("<math>");
        out.push_str(&text[start + MATH_OPEN.len()..end]);
        out.push_str("</math>");
        pos = end + MATH_CLOSE.len();
    }

    out.push_str(&text[pos..]);
    out
}

/// Byte offset of the first `needle` at or after `from`.
fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack[from..].find(needle).map(|i| from + i)
}

/// Rewrite runs of `||` lines as wikitables.
///
/// A run starts at a line beginning with `||` and ends at the next blank line
/// or the end of the span. Every line of the run must be a table row.
fn pipe_tables(text: &str, first_line: usize, at_line_start: bool) -> Result<String, ConvertError> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let starts_run = lines[i].starts_with("||") && (i > 0 || at_line_start);
        if !starts_run {
            out.push(lines[i].to_owned());
            i += 1;
            continue;
        }

        let mut rows = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            rows.push(table_row(lines[i], first_line + i)?);
            i += 1;
        }
        out.push(format!(
            "{{| class=\"wikitable\"\n{}\n|}}",
            rows.join("\n|-\n")
        ));
    }

    Ok(out.join("\n"))
}

/// Convert one `||` line to a wikitable row.
///
/// `||~` header cells become `!!`; the leading delimiter is halved and the
/// trailing one dropped. A bare `||` is an empty row.
fn table_row(line: &str, line_no: usize) -> Result<String, ConvertError> {
    if !line.starts_with("||") {
        return Err(ConvertError::MalformedTable {
            line: line_no,
            content: line.to_owned(),
        });
    }

    let line = line.trim_end();
    let line = line.strip_suffix("||").unwrap_or(line);
    let row = line.replace("||~", "!!");
    Ok(row.get(1..).unwrap_or_default().trim_end().to_owned())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_color_span() {
        assert_eq!(
            color_spans("a ##red|warning## b"),
            r#"a <span style="color:red">warning</span> b"#
        );
    }

    #[test]
    fn test_color_span_hex_and_multiple() {
        assert_eq!(
            color_spans("###00ff00|go## and ##blue|sky##"),
            r#"<span style="color:#00ff00">go</span> and <span style="color:blue">sky</span>"#
        );
    }

    #[test]
    fn test_color_without_end_marker_left_alone() {
        assert_eq!(color_spans("##red|never closed"), "##red|never closed");
    }

    #[test]
    fn test_color_without_pipe_left_alone() {
        assert_eq!(color_spans("## not a colour ##"), "## not a colour ##");
    }

    #[test]
    fn test_color_stray_marker_after_span_kept() {
        assert_eq!(
            color_spans("##red|a## trailing ##"),
            r#"<span style="color:red">a</span> trailing ##"#
        );
    }

    #[test]
    fn test_color_pipe_found_past_next_marker() {
        // The nearest pipe wins, even when another marker comes first.
        assert_eq!(
            color_spans("##a##b|c##"),
            r#"<span style="color:a##b">c</span>"#
        );
    }

    #[test]
    fn test_math_span() {
        assert_eq!(math_spans("E = [[$ mc^2 $]]"), "E = <math> mc^2 </math>");
    }

    #[test]
    fn test_math_unbalanced_left_alone() {
        assert_eq!(math_spans("[[$ x [[$ y $]]"), "<math> x [[$ y </math>");
        assert_eq!(math_spans("open [[$ only"), "open [[$ only");
    }

    #[test]
    fn test_pipe_table() {
        let text = "intro\n||~ Name ||~ Age ||\n|| Ann || 31 ||\n|| Bob || 42 ||\n\nafter";
        let expected = "intro\n{| class=\"wikitable\"\n! Name !! Age\n|-\n| Ann || 31\n|-\n| Bob || 42\n|}\n\nafter";
        assert_eq!(pipe_tables(text, 1, true).unwrap(), expected);
    }

    #[test]
    fn test_pipe_table_at_end_of_text() {
        let text = "|| a ||";
        assert_eq!(
            pipe_tables(text, 1, true).unwrap(),
            "{| class=\"wikitable\"\n| a\n|}"
        );
    }

    #[test]
    fn test_pipe_table_line_without_marker_fails() {
        let text = "x\n|| a ||\nstray line\n|| b ||";
        let err = pipe_tables(text, 1, true).unwrap_err();
        assert_eq!(
            err,
            ConvertError::MalformedTable {
                line: 3,
                content: "stray line".to_owned(),
            }
        );
    }

    #[test]
    fn test_bare_delimiter_is_empty_row() {
        assert_eq!(table_row("||", 2).unwrap(), "");
        assert_eq!(table_row("||  ", 2).unwrap(), "");
        assert_eq!(
            pipe_tables("|| a ||\n||", 1, true).unwrap(),
            "{| class=\"wikitable\"\n| a\n|-\n\n|}"
        );
    }

    #[test]
    fn test_pipe_table_needs_line_start() {
        let text = "|| after code ||";
        assert_eq!(pipe_tables(text, 1, false).unwrap(), "|| after code ||");
    }

    #[test]
    fn test_apply_collapses_blank_lines() {
        assert_eq!(apply("a\n\n\n\nb\n\n\nc", 1, true).unwrap(), "a\n\nb\n\nc");
    }
}
