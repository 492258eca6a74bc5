// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. rules::RuleKind)
    clippy::module_name_repetitions
)]

//! # Styledown
//!
//! Rule-based conversion of markdown into styled rich text.
//!
//! A [`MarkdownParser`](parser::MarkdownParser) runs an ordered set of
//! [`MarkdownRule`](rules::MarkdownRule)s over a mutable
//! [`StyledText`](text::StyledText):
//!
//! 1. **Normalize** whitespace
//! 2. **Seed** base font, colors and paragraph style
//! 3. **Escape** code and backslash-escaped characters into placeholders
//! 4. Run the **default** rules: headers, lists, quotes, images, links,
//!    automatic links, bold, italic, strikethrough
//! 5. Run **custom** rules in registration order
//! 6. **Unescape** placeholders and style code
//!
//! ```
//! use styledown::prelude::*;
//!
//! let parser = MarkdownParser::default();
//! let text = parser.parse("**bold** and \\*escaped\\*").unwrap();
//! assert_eq!(text.as_str(), "bold and *escaped*");
//! assert!(text.attributes_at(0).unwrap().font.bold);
//! ```
//!
//! ## Modules
//!
//! - [`text`]: the styled text buffer and its attributes
//! - [`rules`]: the rule trait, built-in rules and the rule registry
//! - [`parser`]: the pipeline
//! - [`highlight`]: syntax highlighting for fenced code
//! - [`output`]: terminal, JSON and run-listing writers
//! - [`config`]: saved command-line defaults
//! - [`watcher`]: file watching for `--watch`

pub mod config;
pub mod error;
pub mod highlight;
pub mod output;
pub mod parser;
pub mod perf;
pub mod rules;
pub mod text;
pub mod watcher;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, RuleError};
    pub use crate::parser::{MarkdownParser, ParserConfig};
    pub use crate::rules::{CodeStyle, MarkdownRule, RuleHandle};
    pub use crate::text::{Attributes, Color, Font, ParagraphStyle, Platform, StyledText};
}
