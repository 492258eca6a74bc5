//! Inline links: `[text](url "title")`.

use std::sync::OnceLock;

use regex::Regex;

use super::{MarkdownRule, Rewrite, RuleKind, pattern, rewrite, unescape_str};
use crate::error::RuleError;
use crate::text::{Color, StyledText};

pub(crate) const DEFAULT_LINK_COLOR: Color = Color::rgb(0x03, 0x66, 0xd6);

/// Replaces a link with its text, carrying the target as a link attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRule {
    pub color: Color,
    pub underline: bool,
}

impl Default for LinkRule {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_COLOR)
    }
}

impl LinkRule {
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            underline: true,
        }
    }
}

fn link() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(
        &RE,
        r#"\[([^\[\]\n]+)\]\([ \t]*<?([^\s()<>]*)>?(?:[ \t]+"[^"\n]*")?[ \t]*\)"#,
    )
}

impl MarkdownRule for LinkRule {
    fn name(&self) -> &str {
        "link"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Link
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        let Some(regex) = link() else {
            return Ok(());
        };
        rewrite(
            text,
            regex,
            |caps| {
                let whole = caps.get(0)?;
                let target = unescape_str(&caps[2]).into_owned();
                Some(Rewrite::styled_all(whole.range(), caps[1].to_string()).with_payload(target))
            },
            |target, attrs| {
                attrs.link = Some(target.clone());
                attrs.foreground = self.color;
                attrs.underline = self.underline;
            },
        );
        Ok(())
    }
}
