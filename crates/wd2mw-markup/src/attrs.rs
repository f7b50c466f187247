//! Directive attribute parsing.
//!
//! Splits a directive body such as `photo.png size="medium" link='Home' width=200px`
//! into its `key=value` pairs and whatever text is left over.

use std::collections::HashMap;

/// Attributes parsed from a directive body.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct DirectiveAttrs {
    /// Body text with every attribute pair removed, trimmed.
    pub(crate) rest: String,
    /// Attribute values keyed by lowercase name.
    attrs: HashMap<String, String>,
}

impl DirectiveAttrs {
    /// Parse a directive body.
    ///
    /// Pairs are recognized only at the start of a word. Values are double-
    /// or single-quoted, or bare up to the next whitespace. Later duplicates
    /// win.
    pub(crate) fn parse(body: &str) -> Self {
        let mut rest = String::with_capacity(body.len());
        let mut attrs = HashMap::new();
        let mut remaining = body;
        let mut at_word_start = true;

        while let Some(c) = remaining.chars().next() {
            if at_word_start && let Some((key, value, after)) = parse_key_value(remaining) {
                attrs.insert(key.to_ascii_lowercase(), value.to_owned());
                rest.push(' ');
                remaining = after;
                continue;
            }
            rest.push(c);
            at_word_start = c.is_whitespace();
            remaining = &remaining[c.len_utf8()..];
        }

        Self {
            rest: rest.trim().to_owned(),
            attrs,
        }
    }

    /// Get an attribute value by key.
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// Parse `key="value"`, `key='value'` or `key=value` at the start of `s`.
///
/// Returns the key, the value and the text after it.
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let key_len = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(s.len());
    if key_len == 0 {
        return None;
    }

    let after_eq = s[key_len..].trim_start().strip_prefix('=')?.trim_start();
    let key = &s[..key_len];
    let quote = after_eq.chars().next()?;

    if quote == '"' || quote == '\'' {
        let inner = &after_eq[1..];
        let end = inner.find(quote)?;
        return Some((key, &inner[..end], &inner[end + 1..]));
    }

    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
    Some((key, &after_eq[..end], &after_eq[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_without_attrs() {
        let attrs = DirectiveAttrs::parse(" photo.png ");
        assert_eq!(attrs.rest, "photo.png");
        assert_eq!(attrs.get("size"), None);
    }

    #[test]
    fn test_double_quoted_value() {
        let attrs = DirectiveAttrs::parse(r#"photo.png size="medium""#);
        assert_eq!(attrs.rest, "photo.png");
        assert_eq!(attrs.get("size"), Some("medium"));
    }

    #[test]
    fn test_single_quoted_value() {
        let attrs = DirectiveAttrs::parse("photo.png link='Main Page'");
        assert_eq!(attrs.get("link"), Some("Main Page"));
    }

    #[test]
    fn test_attrs_in_any_order() {
        let attrs = DirectiveAttrs::parse(r#"alt="A cat" photo.png width = "200px""#);
        assert_eq!(attrs.rest, "photo.png");
        assert_eq!(attrs.get("alt"), Some("A cat"));
        assert_eq!(attrs.get("width"), Some("200px"));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let attrs = DirectiveAttrs::parse(r#"photo.png SIZE="small""#);
        assert_eq!(attrs.get("size"), Some("small"));
    }

    #[test]
    fn test_filename_with_spaces() {
        let attrs = DirectiveAttrs::parse(r#"my photo.png class="x""#);
        assert_eq!(attrs.rest, "my photo.png");
        assert_eq!(attrs.get("class"), Some("x"));
    }

    #[test]
    fn test_bare_value_ends_at_whitespace() {
        let attrs = DirectiveAttrs::parse("a.png width=200px size=small");
        assert_eq!(attrs.rest, "a.png");
        assert_eq!(attrs.get("width"), Some("200px"));
        assert_eq!(attrs.get("size"), Some("small"));
    }

    #[test]
    fn test_equals_inside_word_is_text() {
        let attrs = DirectiveAttrs::parse("photo.png?w=1");
        assert_eq!(attrs.rest, "photo.png?w=1");
        assert_eq!(attrs.get("w"), None);
    }

    #[test]
    fn test_key_must_start_a_word() {
        let attrs = DirectiveAttrs::parse(r#"photo.png x-size="1""#);
        assert_eq!(attrs.get("x-size"), Some("1"));
        assert_eq!(attrs.get("size"), None);
    }

    #[test]
    fn test_unterminated_quote_is_text() {
        let attrs = DirectiveAttrs::parse(r#"photo.png alt="oops"#);
        assert_eq!(attrs.rest, r#"photo.png alt="oops"#);
        assert_eq!(attrs.get("alt"), None);
    }
}
