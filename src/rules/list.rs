//! List items: `- item`, `* item`, `+ item`, `1. item`, `1) item`.

use std::sync::OnceLock;

use regex::Regex;

use super::{MarkdownRule, Rewrite, RuleKind, pattern, rewrite};
use crate::error::RuleError;
use crate::text::StyledText;

/// Replaces bullet markers with an indicator and indents each item.
/// Ordered markers are kept as written.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRule {
    /// Shown in place of `-`, `*` and `+`.
    pub indicator: String,
    /// Between the marker and the item text.
    pub separator: String,
    /// Head indent of wrapped item lines, in points.
    pub indent: f32,
}

impl Default for ListRule {
    fn default() -> Self {
        Self {
            indicator: "•".to_string(),
            separator: "  ".to_string(),
            indent: 15.0,
        }
    }
}

fn list_item() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&RE, r"(?m)^([*+-]|\d{1,9}[.)])[ \t]+(\S.*)$")
}

impl MarkdownRule for ListRule {
    fn name(&self) -> &str {
        "list"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::List
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        let Some(regex) = list_item() else {
            return Ok(());
        };
        rewrite(
            text,
            regex,
            |caps| {
                let whole = caps.get(0)?;
                let marker = &caps[1];
                let marker = if marker.ends_with(['.', ')']) {
                    marker
                } else {
                    self.indicator.as_str()
                };
                let line = format!("{marker}{}{}", self.separator, &caps[2]);
                Some(Rewrite::styled_all(whole.range(), line))
            },
            |_, attrs| {
                attrs.paragraph.first_line_head_indent = 0.0;
                attrs.paragraph.head_indent = self.indent;
            },
        );
        Ok(())
    }
}
