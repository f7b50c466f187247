//! Wikidot to MediaWiki markup converter.
//!
//! This crate converts one Wikidot page body into MediaWiki markup and reports
//! the internal pages and files it references. It performs no I/O.
//!
//! # Pipeline
//!
//! Conversion is a fixed sequence of text rewrites over the whole document:
//!
//! 1. `[[code]]` blocks are replaced by opaque placeholders
//! 2. inline styles, comments, headings and list markers
//! 3. `[[[internal links]]]`
//! 4. image, gallery and file directives
//! 5. `[[table]]` tag tables
//! 6. code blocks are restored as `<pre>` blocks
//! 7. colour spans, math, `||` tables and blank-line collapsing, outside code
//!
//! Stage order matters: each rule sees the output of every earlier rule.
//!
//! # Example
//!
//! ```
//! use wd2mw_markup::{Converter, PageNames};
//!
//! let pages: PageNames = [("getting-started".to_owned(), "Getting Started".to_owned())].into();
//! let result = Converter::new()
//!     .convert("[[[getting_started]]] [[image logo.png size=\"small\"]]", "home-", &pages)
//!     .unwrap();
//!
//! assert_eq!(result.text, "[[Getting Started]] [[File:home-logo.png|240px]]");
//! assert_eq!(result.linked_files, vec!["logo.png"]);
//! ```

mod attrs;
mod code_block;
mod converter;
mod error;
mod inline;
mod links;
mod media;
mod post;
mod tables;

pub use code_block::CodeBlock;
pub use converter::{ConversionResult, Converter};
pub use error::ConvertError;
pub use links::{PageNameIndex, PageNames, normalize_fullname};
