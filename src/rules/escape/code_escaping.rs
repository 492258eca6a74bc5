use std::sync::OnceLock;

use regex::Regex;

use super::encode_hex;
use crate::error::RuleError;
use crate::rules::{MarkdownRule, Rewrite, RuleKind, pattern, rewrite};
use crate::text::StyledText;

/// Hides the content of fenced code blocks and inline code spans.
///
/// Fenced blocks are protected first, then inline spans. A backtick preceded
/// by a backslash never opens a span; the pair is left for `EscapingRule`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeEscapingRule;

fn fenced_block() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(
        &RE,
        r"(?m)^```[ \t]*([^\s`]*)[^\n]*\n((?s:.*?))^```[ \t]*$",
    )
}

fn inline_span() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&RE, r"\\[\s\S]|``([^\n]+?)``|`([^`\n]+)`")
}

/// Double-backtick spans drop one padding space on each side, so that
/// ``` `` `x` `` ``` holds `` `x` ``.
fn strip_padding(content: &str) -> &str {
    match content.strip_prefix(' ').and_then(|c| c.strip_suffix(' ')) {
        Some(inner) if !inner.trim().is_empty() => inner,
        _ => content,
    }
}

impl MarkdownRule for CodeEscapingRule {
    fn name(&self) -> &str {
        "code-escaping"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::CodeEscaping
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        if let Some(regex) = fenced_block() {
            rewrite(
                text,
                regex,
                |caps| {
                    let whole = caps.get(0)?;
                    let language = &caps[1];
                    let body = &caps[2];
                    let code = body.strip_suffix('\n').unwrap_or(body);
                    let placeholder =
                        format!("```{}\n{}\n```", encode_hex(language), encode_hex(code));
                    Some(Rewrite::styled_all(whole.range(), placeholder))
                },
                |_, _| {},
            );
        }

        if let Some(regex) = inline_span() {
            rewrite(
                text,
                regex,
                |caps| {
                    let whole = caps.get(0)?;
                    let content = match (caps.get(1), caps.get(2)) {
                        (Some(double), _) => strip_padding(double.as_str()),
                        (None, Some(single)) => single.as_str(),
                        // Escaped character, not code
                        (None, None) => return None,
                    };
                    Some(Rewrite::styled_all(
                        whole.range(),
                        format!("`{}`", encode_hex(content)),
                    ))
                },
                |_, _| {},
            );
        }
        Ok(())
    }
}
