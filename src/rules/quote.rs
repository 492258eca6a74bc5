//! Block quotes: `> text`, nested with `>>`.

use std::sync::OnceLock;

use regex::Regex;

use super::{MarkdownRule, Rewrite, RuleKind, pattern, rewrite};
use crate::error::RuleError;
use crate::text::{Color, StyledText};

/// Replaces each `>` with an indicator bar and indents by nesting level.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRule {
    /// One per nesting level.
    pub indicator: String,
    pub separator: String,
    /// Indent per nesting level, in points.
    pub indent: f32,
    pub color: Color,
}

impl Default for QuoteRule {
    fn default() -> Self {
        Self {
            indicator: "┃".to_string(),
            separator: " ".to_string(),
            indent: 10.0,
            color: Color::rgb(0x6a, 0x73, 0x7d),
        }
    }
}

fn quote_line() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&RE, r"(?m)^(>+)[ \t]?(.*)$")
}

impl MarkdownRule for QuoteRule {
    fn name(&self) -> &str {
        "quote"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Quote
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        let Some(regex) = quote_line() else {
            return Ok(());
        };
        rewrite(
            text,
            regex,
            |caps| {
                let whole = caps.get(0)?;
                let level = caps[1].len();
                let line = format!("{}{}{}", self.indicator.repeat(level), self.separator, &caps[2]);
                Some(Rewrite::styled_all(whole.range(), line).with_payload(level))
            },
            |level, attrs| {
                let indent = self.indent * *level as f32;
                attrs.paragraph.first_line_head_indent = indent;
                attrs.paragraph.head_indent = indent;
                attrs.foreground = self.color;
            },
        );
        Ok(())
    }
}
