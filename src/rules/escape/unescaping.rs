use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::{decode_escape, decode_hex};
use crate::error::RuleError;
use crate::highlight::{HighlightTheme, highlight_code};
use crate::rules::{MarkdownRule, Rewrite, RuleKind, pattern};
use crate::text::{Attributes, Color, Font, StyledText};

/// Presentation of inline code and fenced code blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeStyle {
    /// Font for code; `None` uses a monospace font at the surrounding size.
    pub font: Option<Font>,
    pub foreground: Color,
    pub background: Color,
    /// Color fenced blocks with a known language token by token.
    pub syntax_highlighting: bool,
    pub theme: HighlightTheme,
}

impl Default for CodeStyle {
    fn default() -> Self {
        Self {
            font: None,
            foreground: Color::rgb(199, 37, 78),
            background: Color::rgb(246, 248, 250),
            syntax_highlighting: true,
            theme: HighlightTheme::Light,
        }
    }
}

impl CodeStyle {
    fn apply_to(&self, attrs: &mut Attributes) {
        attrs.font = self
            .font
            .clone()
            .unwrap_or_else(|| Font::monospace(attrs.font.size));
        attrs.foreground = self.foreground;
        attrs.background = self.background;
        attrs.code = true;
    }
}

/// Restores every placeholder left by the escaping rules and styles code.
///
/// All placeholder forms are matched by one pattern in a single pass, so
/// restored text is never scanned again.
#[derive(Debug, Clone, Default)]
pub struct UnescapingRule {
    code: CodeStyle,
}

enum Restored {
    Escaped,
    Code { highlights: Vec<(Range<usize>, Color)> },
}

fn placeholder() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(
        &RE,
        r"(?m)^```([0-9a-f]*)\n([0-9a-f]*)\n```$|`([0-9a-f]+)`|\\([0-9a-f]{6})",
    )
}

impl UnescapingRule {
    pub const fn new(code: CodeStyle) -> Self {
        Self { code }
    }

    pub const fn code_style(&self) -> &CodeStyle {
        &self.code
    }

    fn fenced(&self, language: &str, code: String) -> (String, Restored) {
        let highlights = if self.code.syntax_highlighting && !language.is_empty() {
            highlight_code(language, &code, self.code.theme).unwrap_or_default()
        } else {
            Vec::new()
        };
        (code, Restored::Code { highlights })
    }
}

impl MarkdownRule for UnescapingRule {
    fn name(&self) -> &str {
        "unescaping"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Unescaping
    }

    fn apply(&self, text: &mut StyledText) -> Result<(), RuleError> {
        let Some(regex) = placeholder() else {
            return Ok(());
        };
        let rewrites: Vec<Rewrite<Restored>> = regex
            .captures_iter(text.as_str())
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let (replacement, payload) = if let (Some(lang), Some(code)) = (caps.get(1), caps.get(2)) {
                    let language = decode_hex(lang.as_str())?;
                    self.fenced(&language, decode_hex(code.as_str())?)
                } else if let Some(code) = caps.get(3) {
                    (
                        decode_hex(code.as_str())?,
                        Restored::Code {
                            highlights: Vec::new(),
                        },
                    )
                } else {
                    let escaped = decode_escape(caps.get(4)?.as_str())?;
                    (escaped.to_string(), Restored::Escaped)
                };
                Some(Rewrite {
                    range: whole.range(),
                    styled: 0..replacement.len(),
                    replacement,
                    payload,
                })
            })
            .collect();

        for rewrite in rewrites.into_iter().rev() {
            let start = rewrite.range.start;
            text.replace_range(rewrite.range, &rewrite.replacement);
            let Restored::Code { highlights } = rewrite.payload else {
                continue;
            };
            text.update_attributes(start..start + rewrite.replacement.len(), |attrs| {
                self.code.apply_to(attrs);
            });
            for (span, color) in highlights {
                text.update_attributes(start + span.start..start + span.end, |attrs| {
                    attrs.foreground = color;
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::escape::{CodeEscapingRule, EscapingRule, escape_char};

    fn round_trip(source: &str) -> StyledText {
        let mut text = StyledText::plain(source);
        CodeEscapingRule.apply(&mut text).unwrap();
        EscapingRule.apply(&mut text).unwrap();
        UnescapingRule::default().apply(&mut text).unwrap();
        text
    }

    #[test]
    fn test_escaped_char_is_restored_without_styling() {
        let text = round_trip(r"\*literal\*");
        assert_eq!(text.as_str(), "*literal*");
        assert_eq!(text.runs().count(), 1);
        assert!(!text.attributes_at(0).unwrap().code);
    }

    #[test]
    fn test_inline_code_is_restored_and_styled() {
        let text = round_trip("call `*f*()` now");
        assert_eq!(text.as_str(), "call *f*() now");
        let attrs = text.attributes_at(5).unwrap();
        assert!(attrs.code);
        assert_eq!(attrs.font, Font::monospace(Font::default().size));
        assert!(!text.attributes_at(0).unwrap().code);
        assert!(!text.attributes_at(11).unwrap().code);
    }

    #[test]
    fn test_fenced_code_is_restored_byte_for_byte() {
        let code = "let x = `y` + \\*z;\n> not a quote\n# not a header";
        let text = round_trip(&format!("```\n{code}\n```"));
        assert_eq!(text.as_str(), code);
        assert!(text.runs().all(|run| run.attributes.code));
    }

    #[test]
    fn test_fenced_rust_is_highlighted() {
        let text = round_trip("```rust\nfn main() {}\n```");
        assert_eq!(text.as_str(), "fn main() {}");
        let colors: std::collections::HashSet<_> =
            text.runs().map(|run| run.attributes.foreground).collect();
        assert!(colors.len() > 1, "expected several token colors, got {colors:?}");
    }

    #[test]
    fn test_highlighting_can_be_disabled() {
        let rule = UnescapingRule::new(CodeStyle {
            syntax_highlighting: false,
            ..CodeStyle::default()
        });
        let mut text = StyledText::plain("```rust\nfn main() {}\n```");
        CodeEscapingRule.apply(&mut text).unwrap();
        rule.apply(&mut text).unwrap();
        assert_eq!(text.runs().count(), 1);
    }

    #[test]
    fn test_restored_content_is_not_rescanned() {
        // Code whose content looks like an escape placeholder stays literal.
        let literal = escape_char('*');
        let text = round_trip(&format!("`{literal}`"));
        assert_eq!(text.as_str(), literal);
    }

    #[test]
    fn test_malformed_placeholder_is_left_alone() {
        let mut text = StyledText::plain("`ff` and \\00d800");
        UnescapingRule::default().apply(&mut text).unwrap();
        assert_eq!(text.as_str(), "`ff` and \\00d800");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn text_without_escapes_or_code_round_trips(source in "[a-z *_#>\\[\\]()\n]{0,60}") {
                let text = round_trip(&source);
                prop_assert_eq!(text.as_str(), source.as_str());
            }

            #[test]
            fn inline_code_content_round_trips(content in "[^`\n]{1,30}") {
                let text = round_trip(&format!("x `{content}` y"));
                prop_assert_eq!(text.as_str(), format!("x {content} y"));
            }
        }
    }
}
