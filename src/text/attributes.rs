//! Presentation attributes attached to ranges of a `StyledText`.

use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// Target environment used to resolve default fonts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Platform {
    #[default]
    Desktop,
    Mobile,
}

impl Platform {
    /// Point size of the platform's small system font.
    pub const fn small_system_font_size(self) -> f32 {
        match self {
            Self::Desktop => 11.0,
            Self::Mobile => 12.0,
        }
    }
}

/// Font family selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    System,
    Monospace,
    Named(String),
}

/// A font description: family, point size and traits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub family: FontFamily,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl Font {
    pub const fn system(size: f32) -> Self {
        Self {
            family: FontFamily::System,
            size,
            bold: false,
            italic: false,
        }
    }

    pub const fn monospace(size: f32) -> Self {
        Self {
            family: FontFamily::Monospace,
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn named(name: impl Into<String>, size: f32) -> Self {
        Self {
            family: FontFamily::Named(name.into()),
            size,
            bold: false,
            italic: false,
        }
    }

    /// The small system font for `platform`.
    pub const fn small_system(platform: Platform) -> Self {
        Self::system(platform.small_system_font_size())
    }

    #[must_use]
    pub const fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::small_system(Platform::default())
    }
}

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Hex form, `#rrggbb` when opaque and `#rrggbbaa` otherwise.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parses `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || Error::InvalidColor(s.to_string());
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Natural,
    Left,
    Center,
    Right,
    Justified,
}

/// Paragraph layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ParagraphStyle {
    pub alignment: Alignment,
    pub first_line_head_indent: f32,
    pub head_indent: f32,
    pub line_spacing: f32,
    pub paragraph_spacing: f32,
}

/// The full attribute set of one run of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attributes {
    pub font: Font,
    pub foreground: Color,
    pub background: Color,
    pub paragraph: ParagraphStyle,
    /// Link target, set by link and automatic link detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Image source; the run text is the image's alt text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub underline: bool,
    pub strikethrough: bool,
    /// Text came out of an inline code span or a fenced code block.
    pub code: bool,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            font: Font::default(),
            foreground: Color::BLACK,
            background: Color::TRANSPARENT,
            paragraph: ParagraphStyle::default(),
            link: None,
            image: None,
            underline: false,
            strikethrough: false,
            code: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex_rgb() {
        let color: Color = "#1e90ff".parse().unwrap();
        assert_eq!(color, Color::rgb(0x1e, 0x90, 0xff));
    }

    #[test]
    fn test_color_from_hex_with_alpha() {
        let color: Color = "00000000".parse().unwrap();
        assert!(color.is_transparent());
    }

    #[test]
    fn test_color_rejects_bad_input() {
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("#ééé".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_hex_round_trip() {
        let color = Color::rgb(10, 20, 30);
        assert_eq!(color.to_hex(), "#0a141e");
        assert_eq!(color.to_hex().parse::<Color>().unwrap(), color);
    }

    #[test]
    fn test_platform_small_system_font() {
        assert_eq!(Font::small_system(Platform::Desktop).size, 11.0);
        assert_eq!(Font::small_system(Platform::Mobile).size, 12.0);
        assert_eq!(Font::default().family, FontFamily::System);
    }

    #[test]
    fn test_default_attributes_are_black_on_transparent() {
        let attrs = Attributes::default();
        assert_eq!(attrs.foreground, Color::BLACK);
        assert!(attrs.background.is_transparent());
        assert!(attrs.link.is_none());
        assert!(!attrs.code);
    }
}
