//! The markdown pipeline: normalize, seed base attributes, run the rules.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::perf;
use crate::rules::{
    AutomaticLinkRule, BoldRule, CodeEscapingRule, CodeStyle, EscapingRule, HeaderRule, ImageRule,
    ItalicRule, LinkRule, ListRule, MarkdownRule, QuoteRule, RuleHandle, RuleKind, RuleRegistry,
    StrikethroughRule, UnescapingRule, pattern,
};
use crate::rules::link::DEFAULT_LINK_COLOR;
use crate::text::{Color, Font, ParagraphStyle, Platform, StyledText};

/// Base presentation and rule options for a `MarkdownParser`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    pub font: Font,
    /// Font for `**bold**`; `None` makes the surrounding font bold.
    pub bold_font: Option<Font>,
    /// Font for `*italic*`; `None` makes the surrounding font italic.
    pub italic_font: Option<Font>,
    pub font_color: Color,
    pub background_color: Color,
    pub paragraph_style: ParagraphStyle,
    pub automatic_link_detection: bool,
    pub link_color: Color,
    pub code: CodeStyle,
}

impl ParserConfig {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            font: Font::small_system(platform),
            bold_font: None,
            italic_font: None,
            font_color: Color::BLACK,
            background_color: Color::TRANSPARENT,
            paragraph_style: ParagraphStyle::default(),
            automatic_link_detection: true,
            link_color: DEFAULT_LINK_COLOR,
            code: CodeStyle::default(),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::for_platform(Platform::default())
    }
}

/// Turns markdown into styled text by running an ordered set of rules.
///
/// Rules run in four groups: escaping, the built-in markdown rules, custom
/// rules in registration order, and unescaping. A parser is immutable while
/// parsing, so one instance can serve several threads.
#[derive(Debug)]
pub struct MarkdownParser {
    font: Font,
    font_color: Color,
    background_color: Color,
    paragraph_style: ParagraphStyle,
    automatic_link_detection: bool,
    registry: RuleRegistry,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl MarkdownParser {
    pub fn new(config: ParserConfig) -> Self {
        let defaults: Vec<Box<dyn MarkdownRule>> = vec![
            Box::new(HeaderRule::default()),
            Box::new(ListRule::default()),
            Box::new(QuoteRule::default()),
            Box::new(ImageRule),
            Box::new(LinkRule::new(config.link_color)),
            Box::new(AutomaticLinkRule::new(config.link_color)),
            Box::new(BoldRule::new(config.bold_font)),
            Box::new(ItalicRule::new(config.italic_font)),
            Box::new(StrikethroughRule),
        ];
        let registry = RuleRegistry::new(
            vec![Box::new(CodeEscapingRule), Box::new(EscapingRule)],
            defaults,
            vec![Box::new(UnescapingRule::new(config.code))],
        );
        Self {
            font: config.font,
            font_color: config.font_color,
            background_color: config.background_color,
            paragraph_style: config.paragraph_style,
            automatic_link_detection: config.automatic_link_detection,
            registry,
        }
    }

    /// Create a parser with custom rules already registered, in order.
    pub fn with_custom_elements(
        config: ParserConfig,
        rules: impl IntoIterator<Item = Box<dyn MarkdownRule>>,
    ) -> Self {
        let mut parser = Self::new(config);
        for rule in rules {
            parser.registry.add_custom(rule);
        }
        parser
    }

    /// Parse raw markdown.
    ///
    /// # Errors
    /// Returns [`Error::Rule`] if a rule fails.
    pub fn parse(&self, markdown: &str) -> Result<StyledText> {
        self.parse_styled(StyledText::plain(markdown))
    }

    /// Parse text that may already carry attributes.
    ///
    /// Font, colors and paragraph style are overwritten with the parser's
    /// base values; other attributes such as links are kept.
    ///
    /// # Errors
    /// Returns [`Error::Rule`] if a rule fails.
    pub fn parse_styled(&self, mut text: StyledText) -> Result<StyledText> {
        let _scope = perf::scope("parser.parse");
        perf::log_event("parse.start", format!("len={}", text.len()));

        normalize(&mut text);
        text.update_all(|attrs| {
            attrs.font.clone_from(&self.font);
            attrs.foreground = self.font_color;
            attrs.background = self.background_color;
            attrs.paragraph = self.paragraph_style;
        });

        for (group, rule) in self.registry.iter() {
            if rule.kind() == RuleKind::AutomaticLink && !self.automatic_link_detection {
                tracing::debug!(rule = rule.name(), "automatic link detection disabled, skipping");
                continue;
            }
            rule.apply(&mut text).map_err(|source| Error::Rule {
                rule: rule.name().to_string(),
                source,
            })?;
            debug_assert!(text.is_well_formed(), "rule {} broke the run invariants", rule.name());
            tracing::trace!(?group, rule = rule.name(), len = text.len(), "applied rule");
            perf::log_event("rule.applied", format!("{group:?}/{} len={}", rule.name(), text.len()));
        }

        perf::log_event("parse.done", format!("len={} runs={}", text.len(), text.runs().count()));
        Ok(text)
    }

    /// Register a rule to run after the built-in rules and before unescaping.
    pub fn add_custom_element(&mut self, rule: impl MarkdownRule + 'static) -> RuleHandle {
        self.registry.add_custom(Box::new(rule))
    }

    /// Unregister a custom rule. Returns `None` if `handle` is not registered.
    pub fn remove_custom_element(&mut self, handle: RuleHandle) -> Option<Box<dyn MarkdownRule>> {
        self.registry.remove_custom(handle)
    }

    pub const fn automatic_link_detection(&self) -> bool {
        self.automatic_link_detection
    }

    pub fn set_automatic_link_detection(&mut self, enabled: bool) {
        self.automatic_link_detection = enabled;
    }

    pub const fn paragraph_style(&self) -> &ParagraphStyle {
        &self.paragraph_style
    }

    pub fn set_paragraph_style(&mut self, style: ParagraphStyle) {
        self.paragraph_style = style;
    }

    pub const fn font(&self) -> &Font {
        &self.font
    }

    pub const fn font_color(&self) -> Color {
        self.font_color
    }

    pub const fn background_color(&self) -> Color {
        self.background_color
    }

    pub const fn registry(&self) -> &RuleRegistry {
        &self.registry
    }
}

/// Clean up whitespace before any rule runs.
///
/// Runs of three or more line breaks collapse to a paragraph break, `&nbsp;`
/// becomes a space, and whitespace at the start of a line collapses to a
/// single line break. A step whose pattern cannot be compiled is skipped.
pub fn normalize(text: &mut StyledText) {
    static BREAKS: OnceLock<Option<Regex>> = OnceLock::new();
    static NBSP: OnceLock<Option<Regex>> = OnceLock::new();
    static LEADING: OnceLock<Option<Regex>> = OnceLock::new();

    let _scope = perf::scope("parser.normalize");
    let steps = [
        (pattern(&BREAKS, r"\n{3,}"), "\n\n"),
        (pattern(&NBSP, "&nbsp;"), " "),
        (pattern(&LEADING, r"(?m)^\s+"), "\n"),
    ];
    for (regex, replacement) in steps {
        if let Some(regex) = regex {
            replace_all(text, regex, replacement);
        }
    }
}

fn replace_all(text: &mut StyledText, regex: &Regex, replacement: &str) {
    let ranges: Vec<Range<usize>> = regex
        .find_iter(text.as_str())
        .filter(|m| m.as_str() != replacement)
        .map(|m| m.range())
        .collect();
    for range in ranges.into_iter().rev() {
        text.replace_range(range, replacement);
    }
}
