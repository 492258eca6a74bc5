//! ATX headers: `# Title` through `###### Title`.

use std::sync::OnceLock;

use regex::Regex;

use super::{MarkdownRule, Rewrite, RuleKind, pattern, rewrite};
use crate::error::RuleError;
use crate::text::{Font, StyledText};

const MAX_LEVEL: usize = 6;

/// Strips the leading hashes (and an optional closing sequence) and sets a
/// bold font that grows with header importance.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRule {
    /// Font for headers; `None` keeps the surrounding font.
    pub font: Option<Font>,
    /// Points added per level above the smallest header.
    pub font_increase: f32,
}

impl Default for HeaderRule {
    fn default() -> Self {
        Self {
            font: None,
            font_increase: 2.0,
        }
    }
}

fn header_line() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&RE, r"(?m)^(#{1,6})[ \t]+(\S.*?)(?:[ \t]+#+)?[ \t]*$")
}

impl HeaderRule {
    /// Font size for a header of `level` over a `base` size.
    pub fn size_for(&self, level: usize, base: f32) -> f32 {
        base + self.font_increase * MAX_LEVEL.saturating_sub(level) as f32
    }
}

impl MarkdownRule for HeaderRule {
    fn name(&self) -> &str {
        "header"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Header
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        let Some(regex) = header_line() else {
            return Ok(());
        };
        rewrite(
            text,
            regex,
            |caps| {
                let whole = caps.get(0)?;
                Some(Rewrite::styled_all(whole.range(), caps[2].to_string()).with_payload(caps[1].len()))
            },
            |level, attrs| {
                let base = self.font.clone().unwrap_or_else(|| attrs.font.clone());
                attrs.font = Font {
                    size: self.size_for(*level, base.size),
                    bold: true,
                    ..base
                };
            },
        );
        Ok(())
    }
}
