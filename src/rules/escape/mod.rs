//! Protection of literal and code content.
//!
//! The escaping rules run before every semantic rule and replace content
//! that must not be interpreted as markdown with placeholders built only
//! from lowercase hex digits and a framing character:
//!
//! | source | placeholder |
//! |---|---|
//! | `\*` | `\00002a` (backslash + 6 hex digits of the code point) |
//! | `` `code` `` | `` `636f6465` `` (hex of the UTF-8 bytes) |
//! | fenced block | ```` ```<hex lang>\n<hex code>\n``` ```` |
//!
//! Semantic rules that look at the characters around a match (word
//! boundaries, address starts) read an escape placeholder as the character
//! it stands for through [`char_before`] and [`char_after`], and never start
//! a match inside its hex digits. `UnescapingRule` decodes all three forms in
//! a single left to right pass and styles the code.

mod code_escaping;
mod escaping;
mod unescaping;

use std::borrow::Cow;
use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

pub use code_escaping::CodeEscapingRule;
pub use escaping::EscapingRule;
pub use unescaping::{CodeStyle, UnescapingRule};

/// Hex digits per escaped character.
pub(crate) const ESCAPE_WIDTH: usize = 6;

/// Hex-encode the UTF-8 bytes of `s`.
pub(crate) fn encode_hex(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for byte in s.bytes() {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Decode `encode_hex` output; `None` if it is not valid hex-encoded UTF-8.
pub(crate) fn decode_hex(hex: &str) -> Option<String> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }
    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

/// Placeholder for one escaped character.
pub(crate) fn escape_char(c: char) -> String {
    format!("\\{:0width$x}", u32::from(c), width = ESCAPE_WIDTH)
}

/// Decode the hex digits of an escaped-character placeholder.
pub(crate) fn decode_escape(hex: &str) -> Option<char> {
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// The escaped character whose placeholder ends at byte `end` of `s`.
pub(crate) fn escaped_ending_at(s: &str, end: usize) -> Option<char> {
    let start = end.checked_sub(ESCAPE_WIDTH + 1)?;
    let (&slash, digits) = s.as_bytes().get(start..end)?.split_first()?;
    if slash != b'\\' || !digits.iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }
    decode_escape(std::str::from_utf8(digits).ok()?)
}

/// The escaped character whose placeholder starts at byte `start` of `s`.
pub(crate) fn escaped_starting_at(s: &str, start: usize) -> Option<char> {
    escaped_ending_at(s, start.checked_add(ESCAPE_WIDTH + 1)?)
}

/// Whether byte `pos` of `s` is the first hex digit of an escape placeholder.
pub(crate) fn inside_escape(s: &str, pos: usize) -> bool {
    pos.checked_sub(1).is_some_and(|slash| escaped_starting_at(s, slash).is_some())
}

/// The character before byte `pos`, reading a placeholder as its character.
pub(crate) fn char_before(s: &str, pos: usize) -> Option<char> {
    escaped_ending_at(s, pos).or_else(|| s.get(..pos)?.chars().next_back())
}

/// The character at byte `pos`, reading a placeholder as its character.
pub(crate) fn char_after(s: &str, pos: usize) -> Option<char> {
    escaped_starting_at(s, pos).or_else(|| s.get(pos..)?.chars().next())
}

fn inline_placeholder() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    super::pattern(&RE, r"`([0-9a-f]+)`|\\([0-9a-f]{6})")
}

/// Restore escaped-character and inline code placeholders in `s`.
///
/// Used for link and image targets, which leave the buffer as attribute
/// values and never reach the unescaping rule.
pub fn unescape_str(s: &str) -> Cow<'_, str> {
    let Some(regex) = inline_placeholder() else {
        return Cow::Borrowed(s);
    };
    regex.replace_all(s, |caps: &regex::Captures<'_>| {
        let decoded = match (caps.get(1), caps.get(2)) {
            (Some(code), _) => decode_hex(code.as_str()),
            (None, Some(hex)) => decode_escape(hex.as_str()).map(String::from),
            (None, None) => None,
        };
        decoded.unwrap_or_else(|| caps[0].to_string())
    })
}
