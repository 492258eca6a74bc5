//! Markdown rules.
//!
//! A rule scans a `StyledText` and rewrites the constructs it recognizes in
//! place: it strips the markdown punctuation and styles the text that
//! remains. Rules run one after another over the same buffer, so each one
//! only sees what earlier rules left behind.
//!
//! - [`escape`]: protection of escaped characters and code, and its reversal
//! - [`header`], [`list`], [`quote`]: block constructs
//! - [`image`], [`link`], [`automatic_link`]: link-like constructs
//! - [`emphasis`]: bold, italic and strikethrough

pub mod automatic_link;
pub mod emphasis;
pub mod escape;
pub mod header;
pub mod image;
pub mod link;
pub mod list;
pub mod quote;
mod registry;

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::RuleError;
use crate::text::{Attributes, StyledText};

pub use automatic_link::AutomaticLinkRule;
pub use emphasis::{BoldRule, ItalicRule, StrikethroughRule};
pub use escape::{CodeEscapingRule, CodeStyle, EscapingRule, UnescapingRule, unescape_str};
pub use header::HeaderRule;
pub use image::ImageRule;
pub use link::LinkRule;
pub use list::ListRule;
pub use quote::QuoteRule;
pub use registry::{RuleGroup, RuleHandle, RuleRegistry};

/// A unit of markdown-to-style transformation.
///
/// `apply` gets exclusive use of the buffer for the duration of the call and
/// must leave it well formed. It may grow or shrink the text, and should
/// only style text it produced. A rule that returns an error aborts the
/// whole parse.
pub trait MarkdownRule: fmt::Debug + Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Which built-in construct this rule handles.
    fn kind(&self) -> RuleKind {
        RuleKind::Custom
    }

    /// Rewrite `text` in place.
    ///
    /// # Errors
    /// Returns an error when the rule cannot complete; the parse is aborted.
    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError>;
}

/// Built-in rule identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    CodeEscaping,
    Escaping,
    Header,
    List,
    Quote,
    Image,
    Link,
    AutomaticLink,
    Bold,
    Italic,
    Strikethrough,
    Unescaping,
    Custom,
}

/// One planned edit: replace `range` with `replacement`, then style the
/// `styled` part of the replacement (relative to its start).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rewrite<T> {
    pub range: Range<usize>,
    pub replacement: String,
    pub styled: Range<usize>,
    pub payload: T,
}

impl Rewrite<()> {
    /// Replace `range` with `replacement` and style all of it.
    pub fn styled_all(range: Range<usize>, replacement: String) -> Self {
        let styled = 0..replacement.len();
        Self {
            range,
            replacement,
            styled,
            payload: (),
        }
    }

    /// Attach data for the style callback.
    pub fn with_payload<T>(self, payload: T) -> Rewrite<T> {
        Rewrite {
            range: self.range,
            replacement: self.replacement,
            styled: self.styled,
            payload,
        }
    }
}

/// Plan one rewrite per match of `regex`, then apply them.
///
/// Matches are collected against the current text before anything changes.
pub(crate) fn rewrite<T>(
    text: &mut StyledText,
    regex: &Regex,
    mut plan: impl FnMut(&Captures<'_>) -> Option<Rewrite<T>>,
    style: impl FnMut(&T, &mut Attributes),
) {
    let rewrites: Vec<Rewrite<T>> = regex
        .captures_iter(text.as_str())
        .filter_map(|caps| plan(&caps))
        .collect();
    apply_rewrites(text, rewrites, style);
}

/// Apply non-overlapping rewrites sorted by position, back to front so that
/// earlier offsets stay valid.
pub(crate) fn apply_rewrites<T>(
    text: &mut StyledText,
    rewrites: Vec<Rewrite<T>>,
    mut style: impl FnMut(&T, &mut Attributes),
) {
    for rewrite in rewrites.into_iter().rev() {
        let start = rewrite.range.start;
        text.replace_range(rewrite.range, &rewrite.replacement);
        let styled = start + rewrite.styled.start..start + rewrite.styled.end;
        text.update_attributes(styled, |attrs| style(&rewrite.payload, attrs));
    }
}

/// Compile `source` once per process.
///
/// A pattern that fails to compile is logged and yields `None`; the rule
/// that owns it then leaves the buffer untouched.
pub(crate) fn pattern(cell: &'static OnceLock<Option<Regex>>, source: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(source) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::warn!(pattern = source, error = %err, "markdown pattern failed to compile");
            None
        }
    })
    .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Color;

    #[test]
    fn test_rewrite_applies_back_to_front() {
        static RE: OnceLock<Option<Regex>> = OnceLock::new();
        let regex = pattern(&RE, r"<(\w+)>").unwrap();
        let mut text = StyledText::plain("a <one> b <two>");
        rewrite(
            &mut text,
            regex,
            |caps| {
                let whole = caps.get(0)?;
                Some(Rewrite::styled_all(whole.range(), caps[1].to_uppercase()))
            },
            |_, attrs| attrs.foreground = Color::WHITE,
        );
        assert_eq!(text.as_str(), "a ONE b TWO");
        assert_eq!(text.attributes_at(2).unwrap().foreground, Color::WHITE);
        assert_eq!(text.attributes_at(5).unwrap().foreground, Color::BLACK);
        assert_eq!(text.attributes_at(8).unwrap().foreground, Color::WHITE);
    }

    #[test]
    fn test_rewrite_styles_only_requested_part() {
        static RE: OnceLock<Option<Regex>> = OnceLock::new();
        let regex = pattern(&RE, r"!(\w+)").unwrap();
        let mut text = StyledText::plain("x !hey");
        rewrite(
            &mut text,
            regex,
            |caps| {
                let whole = caps.get(0)?;
                Some(Rewrite {
                    range: whole.range(),
                    replacement: format!("> {}", &caps[1]),
                    styled: 2..5,
                    payload: Color::WHITE,
                })
            },
            |color, attrs| attrs.foreground = *color,
        );
        assert_eq!(text.as_str(), "x > hey");
        assert_eq!(text.attributes_at(2).unwrap().foreground, Color::BLACK);
        assert_eq!(text.attributes_at(4).unwrap().foreground, Color::WHITE);
    }

    #[test]
    fn test_invalid_pattern_yields_none() {
        static RE: OnceLock<Option<Regex>> = OnceLock::new();
        assert!(pattern(&RE, r"(unclosed").is_none());
    }
}
