//! Styled text model.
//!
//! This module handles:
//! - The mutable `StyledText` buffer every rule rewrites in place
//! - Per-range presentation attributes (font, colors, paragraph layout)
//! - Platform font defaults

mod attributes;
mod buffer;

pub use attributes::{
    Alignment, Attributes, Color, Font, FontFamily, ParagraphStyle, Platform,
};
pub use buffer::{StyledRun, StyledText};
