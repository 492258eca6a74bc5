//! Writers for parsed text: terminal escapes, JSON and a run listing.

use std::fmt::Write as _;
use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};

use crate::text::{Attributes, Color, FontFamily, StyledText};

/// How the `styledown` command prints its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Terminal escape sequences
    #[default]
    Ansi,
    /// The buffer as JSON
    Json,
    /// One line per run
    Runs,
}

impl OutputFormat {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ansi => "ansi",
            Self::Json => "json",
            Self::Runs => "runs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ansi" => Some(Self::Ansi),
            "json" => Some(Self::Json),
            "runs" => Some(Self::Runs),
            _ => None,
        }
    }
}

const fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Write `text` with terminal styling.
///
/// Colors equal to `base_foreground` and transparent backgrounds are left to
/// the terminal. Font size has no terminal equivalent and is dropped.
///
/// # Errors
/// Returns any error from `writer`.
pub fn write_ansi(writer: &mut impl Write, text: &StyledText, base_foreground: Color) -> io::Result<()> {
    let _scope = crate::perf::scope("output.ansi");
    for run in text.runs() {
        let attrs = run.attributes;
        let mut styled = false;
        for (on, attribute) in [
            (attrs.font.bold, Attribute::Bold),
            (attrs.font.italic, Attribute::Italic),
            (attrs.underline, Attribute::Underlined),
            (attrs.strikethrough, Attribute::CrossedOut),
        ] {
            if on {
                queue!(writer, SetAttribute(attribute))?;
                styled = true;
            }
        }
        if attrs.foreground != base_foreground && !attrs.foreground.is_transparent() {
            queue!(writer, SetForegroundColor(term_color(attrs.foreground)))?;
            styled = true;
        }
        if !attrs.background.is_transparent() {
            queue!(writer, SetBackgroundColor(term_color(attrs.background)))?;
            styled = true;
        }
        queue!(writer, Print(run.text))?;
        if styled {
            queue!(writer, SetAttribute(Attribute::Reset))?;
        }
    }
    writer.flush()
}

/// Serialize `text` as pretty JSON.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn to_json(text: &StyledText) -> serde_json::Result<String> {
    serde_json::to_string_pretty(text)
}

/// Short human-readable form of `attrs`.
pub fn describe(attrs: &Attributes) -> String {
    let font = &attrs.font;
    let mut out = match &font.family {
        FontFamily::System => "system".to_string(),
        FontFamily::Monospace => "monospace".to_string(),
        FontFamily::Named(name) => name.clone(),
    };
    let _ = write!(out, " {}", font.size);
    for (on, flag) in [
        (font.bold, "bold"),
        (font.italic, "italic"),
        (attrs.underline, "underline"),
        (attrs.strikethrough, "strike"),
        (attrs.code, "code"),
    ] {
        if on {
            out.push(' ');
            out.push_str(flag);
        }
    }
    let _ = write!(out, " fg={}", attrs.foreground.to_hex());
    if !attrs.background.is_transparent() {
        let _ = write!(out, " bg={}", attrs.background.to_hex());
    }
    let paragraph = &attrs.paragraph;
    if paragraph.head_indent > 0.0 || paragraph.first_line_head_indent > 0.0 {
        let _ = write!(out, " indent={}/{}", paragraph.first_line_head_indent, paragraph.head_indent);
    }
    if let Some(link) = &attrs.link {
        let _ = write!(out, " link={link}");
    }
    if let Some(image) = &attrs.image {
        let _ = write!(out, " image={image}");
    }
    out
}

/// One line per run: byte range, attributes and the quoted text.
///
/// # Errors
/// Returns any error from `writer`.
pub fn write_runs(writer: &mut impl Write, text: &StyledText) -> io::Result<()> {
    for run in text.runs() {
        writeln!(
            writer,
            "{}..{} {} {:?}",
            run.range.start,
            run.range.end,
            describe(run.attributes),
            run.text
        )?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::MarkdownParser;
    use regex::Regex;

    fn strip_ansi(s: &str) -> String {
        Regex::new(r"\x1b\[[0-9;]*m").unwrap().replace_all(s, "").into_owned()
    }

    fn ansi(markdown: &str) -> String {
        let text = MarkdownParser::default().parse(markdown).unwrap();
        let mut out = Vec::new();
        write_ansi(&mut out, &text, Color::BLACK).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_ansi_plain_text_has_no_escapes() {
        assert_eq!(ansi("just words"), "just words");
    }

    #[test]
    fn test_ansi_marks_bold_and_strike() {
        let out = ansi("**b** ~~s~~");
        assert!(out.contains("\x1b[1m"), "missing bold in {out:?}");
        assert!(out.contains("\x1b[9m"), "missing crossed out in {out:?}");
        assert_eq!(strip_ansi(&out), "b s");
    }

    #[test]
    fn test_ansi_colors_links() {
        let out = ansi("[x](https://e.org)");
        assert!(out.contains("\x1b[38;2;"), "missing link color in {out:?}");
        assert_eq!(strip_ansi(&out), "x");
    }

    #[test]
    fn test_json_has_text_and_runs() {
        let text = MarkdownParser::default().parse("a **b**").unwrap();
        let value: serde_json::Value = serde_json::from_str(&to_json(&text).unwrap()).unwrap();
        assert_eq!(value["text"], "a b");
        let runs = value["runs"].as_array().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1]["attributes"]["font"]["bold"], true);
        assert_eq!(runs[1]["range"]["start"], 2);
    }

    #[test]
    fn test_runs_listing() {
        let text = MarkdownParser::default().parse("a `c`").unwrap();
        let mut out = Vec::new();
        write_runs(&mut out, &text).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0..2 system 11 fg=#000000"), "{}", lines[0]);
        assert!(lines[1].contains("monospace 11 code"), "{}", lines[1]);
        assert!(lines[1].ends_with("\"c\""));
    }

    #[test]
    fn test_format_names_round_trip() {
        for format in [OutputFormat::Ansi, OutputFormat::Json, OutputFormat::Runs] {
            assert_eq!(OutputFormat::from_name(format.name()), Some(format));
        }
        assert_eq!(OutputFormat::from_name("html"), None);
    }
}
