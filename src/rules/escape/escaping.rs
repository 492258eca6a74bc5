use std::sync::OnceLock;

use regex::Regex;

use super::escape_char;
use crate::error::RuleError;
use crate::rules::{MarkdownRule, Rewrite, RuleKind, pattern, rewrite};
use crate::text::StyledText;

/// Replaces backslash-escaped characters with placeholders.
///
/// Any character except a line break can be escaped. Runs after
/// `CodeEscapingRule`, so backslashes inside code are already protected.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapingRule;

fn escaped_char() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&RE, r"\\([^\n])")
}

impl MarkdownRule for EscapingRule {
    fn name(&self) -> &str {
        "escaping"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Escaping
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        let Some(regex) = escaped_char() else {
            return Ok(());
        };
        rewrite(
            text,
            regex,
            |caps| {
                let whole = caps.get(0)?;
                let escaped = caps[1].chars().next()?;
                Some(Rewrite::styled_all(whole.range(), escape_char(escaped)))
            },
            |_, _| {},
        );
        Ok(())
    }
}
