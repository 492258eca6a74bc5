//! Syntax highlighting for fenced code blocks.
//!
//! Uses syntect for highlighting with Sublime Text syntax definitions.

use std::ops::Range;
use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::text::Color;

/// Which family of highlighting themes to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum HighlightTheme {
    #[default]
    Light,
    Dark,
}

/// Highlight `code` written in `language`.
///
/// Returns foreground colors for byte ranges of `code`, or `None` when the
/// language is unknown.
pub fn highlight_code(
    language: &str,
    code: &str,
    theme: HighlightTheme,
) -> Option<Vec<(Range<usize>, Color)>> {
    let _scope = crate::perf::scope("highlight.code");
    let syntax_set = syntax_set();
    let syntax = syntax_set
        .find_syntax_by_token(language)
        .or_else(|| syntax_set.find_syntax_by_name(language))?;

    let mut highlighter = HighlightLines::new(syntax, theme_for(theme));
    let mut spans = Vec::new();
    let mut offset = 0;
    for line in LinesWithEndings::from(code) {
        let ranges = match highlighter.highlight_line(line, syntax_set) {
            Ok(ranges) => ranges,
            Err(err) => {
                tracing::debug!(language, error = %err, "highlighting stopped early");
                break;
            }
        };
        for (style, token) in ranges {
            let fg = style.foreground;
            let range = offset..offset + token.len();
            offset = range.end;
            if token.trim().is_empty() {
                continue;
            }
            spans.push((range, Color::rgb(fg.r, fg.g, fg.b)));
        }
    }
    Some(spans)
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntax_set.load_defaults");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.theme.load_defaults");
        ThemeSet::load_defaults()
    })
}

const LIGHT_THEMES: &[&str] = &["InspiredGitHub", "Solarized (light)", "base16-ocean.light"];
const DARK_THEMES: &[&str] = &["base16-ocean.dark", "base16-eighties.dark", "Solarized (dark)"];

fn theme_for(mode: HighlightTheme) -> &'static Theme {
    static LIGHT: OnceLock<Theme> = OnceLock::new();
    static DARK: OnceLock<Theme> = OnceLock::new();
    let (cell, preferred) = match mode {
        HighlightTheme::Light => (&LIGHT, LIGHT_THEMES),
        HighlightTheme::Dark => (&DARK, DARK_THEMES),
    };
    cell.get_or_init(|| {
        let themes = &theme_set().themes;
        preferred
            .iter()
            .find_map(|name| themes.get(*name))
            .or_else(|| themes.values().next())
            .cloned()
            .unwrap_or_default()
    })
}
