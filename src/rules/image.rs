//! Inline images: `![alt](src "title")`.

use std::sync::OnceLock;

use regex::Regex;

use super::{MarkdownRule, Rewrite, RuleKind, pattern, rewrite, unescape_str};
use crate::error::RuleError;
use crate::text::StyledText;

/// Replaces an image reference with its alt text (or the source when the
/// alt text is empty) and records the source on that text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRule;

fn image() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(
        &RE,
        r#"!\[([^\]\n]*)\]\([ \t]*<?([^\s()<>]+)>?(?:[ \t]+"[^"\n]*")?[ \t]*\)"#,
    )
}

impl MarkdownRule for ImageRule {
    fn name(&self) -> &str {
        "image"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Image
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        let Some(regex) = image() else {
            return Ok(());
        };
        rewrite(
            text,
            regex,
            |caps| {
                let whole = caps.get(0)?;
                let alt = caps[1].trim();
                let source = &caps[2];
                let shown = if alt.is_empty() { source } else { alt };
                let target = unescape_str(source).into_owned();
                Some(Rewrite::styled_all(whole.range(), shown.to_string()).with_payload(target))
            },
            |source, attrs| attrs.image = Some(source.clone()),
        );
        Ok(())
    }
}
