//! Inline emphasis: `**bold**`, `*italic*` and `~~strikethrough~~`.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::escape::{char_after, char_before};
use super::{MarkdownRule, Rewrite, RuleKind, pattern, rewrite};
use crate::error::RuleError;
use crate::text::{Font, StyledText};

/// Content of the first matched alternative.
fn inner(caps: &Captures<'_>) -> Option<Rewrite<()>> {
    let whole = caps.get(0)?;
    let content = caps.iter().skip(1).flatten().next()?;
    Some(Rewrite::styled_all(whole.range(), content.as_str().to_string()))
}

/// `**text**` and `__text__`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoldRule {
    /// Replaces the surrounding font when set; otherwise it is made bold.
    pub font: Option<Font>,
}

impl BoldRule {
    pub const fn new(font: Option<Font>) -> Self {
        Self { font }
    }
}

fn bold() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&RE, r"\*\*(\S(?:[^\n]*?\S)?)\*\*|__(\S(?:[^\n]*?\S)?)__")
}

impl MarkdownRule for BoldRule {
    fn name(&self) -> &str {
        "bold"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Bold
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        let Some(regex) = bold() else {
            return Ok(());
        };
        rewrite(text, regex, inner, |_, attrs| {
            attrs.font = match &self.font {
                Some(font) => font.clone(),
                None => attrs.font.clone().bold(),
            };
        });
        Ok(())
    }
}

/// `*text*` and `_text_`.
///
/// The underscore form only counts between non-word characters, so
/// `snake_case_name` stays as written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItalicRule {
    /// Replaces the surrounding font when set; otherwise it is made italic.
    pub font: Option<Font>,
}

impl ItalicRule {
    pub const fn new(font: Option<Font>) -> Self {
        Self { font }
    }
}

fn italic() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(
        &RE,
        r"\*([^*\s](?:[^*\n]*[^*\s])?)\*|_([^_\s](?:[^_\n]*[^_\s])?)_",
    )
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether an underscore span starting at `start` and ending at `end` sits
/// between word boundaries. Escaped neighbours count as their characters.
fn underscore_bounded(source: &str, start: usize, end: usize) -> bool {
    let before = char_before(source, start);
    let after = char_after(source, end);
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

impl MarkdownRule for ItalicRule {
    fn name(&self) -> &str {
        "italic"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Italic
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        let Some(regex) = italic() else {
            return Ok(());
        };
        let source = text.as_str().to_string();
        rewrite(
            text,
            regex,
            |caps| {
                let whole = caps.get(0)?;
                if caps.get(2).is_some() && !underscore_bounded(&source, whole.start(), whole.end()) {
                    return None;
                }
                inner(caps)
            },
            |_, attrs| {
                attrs.font = match &self.font {
                    Some(font) => font.clone(),
                    None => attrs.font.clone().italic(),
                };
            },
        );
        Ok(())
    }
}

/// `~~text~~`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrikethroughRule;

fn strikethrough() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&RE, r"~~([^~\s](?:[^~\n]*[^~\s])?)~~")
}

impl MarkdownRule for StrikethroughRule {
    fn name(&self) -> &str {
        "strikethrough"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Strikethrough
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        let Some(regex) = strikethrough() else {
            return Ok(());
        };
        rewrite(text, regex, inner, |_, attrs| attrs.strikethrough = true);
        Ok(())
    }
}
