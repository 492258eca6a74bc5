//! Bare URLs and email addresses.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::escape::{ESCAPE_WIDTH, char_before, escaped_ending_at, inside_escape};
use super::link::DEFAULT_LINK_COLOR;
use super::{MarkdownRule, RuleKind, pattern, unescape_str};
use crate::error::RuleError;
use crate::text::{Color, StyledText};

/// Turns `http(s)://…`, `www.…` and `user@host` into links without
/// changing the text. Text that already carries a link is skipped.
///
/// Escaped characters count as the characters they stand for, so
/// `\<me@example.com\>` links `me@example.com`.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomaticLinkRule {
    pub color: Color,
    pub underline: bool,
}

impl Default for AutomaticLinkRule {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_COLOR)
    }
}

impl AutomaticLinkRule {
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            underline: true,
        }
    }
}

fn candidate() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(
        &RE,
        r"(?i)(?:https?://|www\.)[^\s<>()\[\]`]+|\b[\w.+-]+@[\w-]+(?:\.[\w-]+)+",
    )
}

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

/// Characters that end an address when they appear escaped.
const CLOSING: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', '<', '>', '(', ')', '[', ']'];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Narrow a raw match to the address it holds, or `None` if nothing is left.
///
/// The start skips the hex digits of a placeholder the match began inside,
/// and must not follow a word character. The end drops trailing
/// punctuation, plain or escaped.
fn address_range(source: &str, found: Range<usize>) -> Option<Range<usize>> {
    let mut start = found.start;
    if inside_escape(source, start) {
        start += ESCAPE_WIDTH;
    }
    if char_before(source, start).is_some_and(is_word_char) {
        return None;
    }
    let mut end = found.end;
    loop {
        let trimmed = source[start..end].trim_end_matches(TRAILING_PUNCTUATION);
        end = start + trimmed.len();
        match escaped_ending_at(source, end) {
            Some(c) if CLOSING.contains(&c) && end - start > ESCAPE_WIDTH + 1 => {
                end -= ESCAPE_WIDTH + 1;
            }
            _ => break,
        }
    }
    let address = &source[start..end];
    let usable = !address.starts_with('@')
        && (address.contains('@') || address.contains("://") || address.len() > "www.".len());
    usable.then_some(start..end)
}

/// Link target for a detected address.
fn target_for(found: &str) -> String {
    let lower = found.to_ascii_lowercase();
    let target = if lower.starts_with("http://") || lower.starts_with("https://") {
        found.to_string()
    } else if lower.starts_with("www.") {
        format!("http://{found}")
    } else {
        format!("mailto:{found}")
    };
    unescape_str(&target).into_owned()
}

impl MarkdownRule for AutomaticLinkRule {
    fn name(&self) -> &str {
        "automatic-link"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::AutomaticLink
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        let Some(regex) = candidate() else {
            return Ok(());
        };
        let source = text.as_str();
        let found: Vec<(Range<usize>, String)> = regex
            .find_iter(source)
            .filter_map(|m| {
                let range = address_range(source, m.range())?;
                let linked = text.runs_in(range.clone()).any(|run| run.attributes.link.is_some());
                (!linked).then(|| (range.clone(), target_for(&source[range])))
            })
            .collect();

        for (range, target) in found {
            text.update_attributes(range, |attrs| {
                attrs.link = Some(target.clone());
                attrs.foreground = self.color;
                attrs.underline = self.underline;
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::escape::escape_char;
    use crate::text::Attributes;

    fn detect(source: &str) -> StyledText {
        let mut text = StyledText::plain(source);
        AutomaticLinkRule::default().apply(&mut text).unwrap();
        text
    }

    fn link_at(text: &StyledText, offset: usize) -> Option<&str> {
        text.attributes_at(offset)?.link.as_deref()
    }

    #[test]
    fn test_detects_url_without_changing_text() {
        let text = detect("visit https://example.com/a?b=1 today");
        assert_eq!(text.as_str(), "visit https://example.com/a?b=1 today");
        assert_eq!(link_at(&text, 6), Some("https://example.com/a?b=1"));
        assert_eq!(link_at(&text, 0), None);
        assert_eq!(link_at(&text, text.len() - 1), None);
    }

    #[test]
    fn test_trailing_punctuation_is_excluded() {
        let text = detect("See www.example.org.");
        assert_eq!(link_at(&text, 4), Some("http://www.example.org"));
        assert_eq!(link_at(&text, text.len() - 1), None);
    }

    #[test]
    fn test_email_gets_mailto() {
        let text = detect("mail me@example.com");
        assert_eq!(link_at(&text, 5), Some("mailto:me@example.com"));
    }

    #[test]
    fn test_existing_link_is_kept() {
        let attrs = Attributes {
            link: Some("https://other".to_string()),
            ..Attributes::default()
        };
        let mut text = StyledText::with_attributes("https://example.com", attrs);
        AutomaticLinkRule::default().apply(&mut text).unwrap();
        assert_eq!(link_at(&text, 0), Some("https://other"));
    }

    #[test]
    fn test_email_after_escaped_bracket() {
        let source = format!("write to {}me@example.com{}", escape_char('<'), escape_char('>'));
        let text = detect(&source);
        let at = source.find("me@").unwrap();
        assert_eq!(link_at(&text, at), Some("mailto:me@example.com"));
        assert_eq!(link_at(&text, at - 1), None, "placeholder digits stay unlinked");
        assert_eq!(link_at(&text, source.len() - 1), None);
    }

    #[test]
    fn test_url_between_escaped_brackets() {
        let source = format!("{}https://example.com{}", escape_char('<'), escape_char('>'));
        let text = detect(&source);
        assert_eq!(link_at(&text, 7), Some("https://example.com"));
        assert_eq!(link_at(&text, source.len() - 1), None);
    }

    #[test]
    fn test_escaped_char_inside_url_is_decoded() {
        let source = format!("https://example.com/a{}b", escape_char('_'));
        let text = detect(&source);
        assert_eq!(link_at(&text, 0), Some("https://example.com/a_b"));
        assert_eq!(link_at(&text, source.len() - 1), Some("https://example.com/a_b"));
    }

    #[test]
    fn test_url_glued_to_word_is_not_linked() {
        let text = detect("xhttps://example.com");
        assert_eq!(text.runs().count(), 1);
    }

    #[test]
    fn test_plain_words_are_not_links() {
        let text = detect("nothing to see here.");
        assert_eq!(text.runs().count(), 1);
    }
}
