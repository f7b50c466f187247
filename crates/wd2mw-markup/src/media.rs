//! Image, gallery and file directives.
//!
//! Every filename emitted in markup gets the document's file prefix. The
//! unprefixed name is appended to the linked-files list, in source order.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::attrs::DirectiveAttrs;

// One alternation so that files are reported in source order regardless of
// directive kind.
static MEDIA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\[\[(?P<align>f<|f>|<|>|=)?image\s+(?P<image>[^\]\n]*?)\]\]",
        r"|(?s:\[\[gallery(?:\s[^\]]*)?\]\](?P<gallery>.*?)\[\[/gallery\]\])",
        r"|\[\[file\s+(?P<file>[^\]|\n]+?)\s*(?:\|(?P<label>[^\]\n]*))?\]\]",
    ))
    .expect("invalid media regex")
});

/// Horizontal placement of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Alignment {
    Left,
    Right,
    Center,
}

impl Alignment {
    /// Map an image prefix token. Floating and plain variants coincide.
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "<" | "f<" => Some(Self::Left),
            ">" | "f>" => Some(Self::Right),
            "=" => Some(Self::Center),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }
}

/// Map a Wikidot `size` keyword to a MediaWiki size option.
///
/// `original` and unknown keywords yield no option.
fn size_option(size: &str) -> Option<&'static str> {
    match size {
        "square" => Some("75x75px"),
        "thumbnail" => Some("100px"),
        "small" => Some("240px"),
        "medium" => Some("500px"),
        "medium640" => Some("640px"),
        "large" => Some("1024px"),
        "original" => None,
        other => {
            tracing::debug!(size = %other, "Unknown image size keyword");
            None
        }
    }
}

/// An `[[image]]` directive.
#[derive(Debug, PartialEq, Eq)]
struct ImageDirective {
    filename: String,
    alignment: Option<Alignment>,
    width: Option<String>,
    height: Option<String>,
    size: Option<String>,
    link: Option<String>,
    alt: Option<String>,
}

impl ImageDirective {
    fn parse(prefix: Option<&str>, body: &str) -> Self {
        let attrs = DirectiveAttrs::parse(body);
        let owned = |key: &str| attrs.get(key).map(str::to_owned);
        Self {
            alignment: prefix.and_then(Alignment::from_prefix),
            width: owned("width"),
            height: owned("height"),
            size: owned("size"),
            link: owned("link"),
            alt: owned("alt"),
            filename: attrs.rest,
        }
    }

    /// Options in their fixed output order.
    fn options(&self) -> Vec<String> {
        let mut options = Vec::new();
        if let Some(alignment) = self.alignment {
            options.push(alignment.as_str().to_owned());
        }
        if let Some(width) = &self.width {
            options.push(width.clone());
        }
        if let Some(height) = &self.height {
            options.push(format!("x{height}"));
        }
        if let Some(size) = self.size.as_deref().and_then(size_option) {
            options.push(size.to_owned());
        }
        if let Some(link) = &self.link {
            options.push(format!("link={link}"));
        }
        if let Some(alt) = &self.alt {
            options.push(format!("alt={alt}"));
        }
        options
    }

    fn render(&self, file_prefix: &str) -> String {
        let mut out = format!("[[File:{file_prefix}{}", self.filename);
        for option in self.options() {
            out.push('|');
            out.push_str(&option);
        }
        out.push_str("]]");
        out
    }
}

/// Filenames listed in a `[[gallery]]` block; per-item attributes dropped.
fn gallery_filenames(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.trim_start().strip_prefix(':'))
        .map(|item| DirectiveAttrs::parse(item).rest)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Rewrite every image, gallery and file directive in one pass.
pub(crate) fn apply(text: &str, file_prefix: &str, files: &mut Vec<String>) -> String {
    MEDIA
        .replace_all(text, |caps: &Captures| {
            if let Some(body) = caps.name("image") {
                let align = caps.name("align").map(|m| m.as_str());
                let image = ImageDirective::parse(align, body.as_str());
                if image.filename.is_empty() {
                    return caps[0].to_owned();
                }
                let out = image.render(file_prefix);
                files.push(image.filename);
                out
            } else if let Some(body) = caps.name("gallery") {
                render_gallery(body.as_str(), file_prefix, files)
            } else {
                let filename = caps["file"].trim();
                let prefixed = format!("{file_prefix}{filename}");
                let label = caps.name("label").map_or(prefixed.as_str(), |m| m.as_str());
                let out = format!("[[Media:{prefixed}|{label}]]");
                files.push(filename.to_owned());
                out
            }
        })
        .into_owned()
}

fn render_gallery(body: &str, file_prefix: &str, files: &mut Vec<String>) -> String {
    let mut out = String::from("<gallery>\n");
    for filename in gallery_filenames(body) {
        out.push_str(file_prefix);
        out.push_str(&filename);
        out.push('\n');
        files.push(filename);
    }
    out.push_str("</gallery>");
    out
}
