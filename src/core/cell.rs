//! Terminal Cell
//!
//! Represents a single cell in the terminal grid, containing a character
//! and the pen it was drawn with.

use serde::{Deserialize, Serialize};

use super::color::{ColorPalette, Rgb};

/// Text style flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Attributes {
    /// Check if no flag is set
    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.underline
    }
}

/// The current drawing state: colors plus style flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pen {
    pub foreground: Rgb,
    pub background: Rgb,
    pub attributes: Attributes,
}

impl Pen {
    /// Pen with the palette's default colors and no style flags
    pub fn from_palette(palette: &ColorPalette) -> Self {
        Self {
            foreground: palette.foreground,
            background: palette.background,
            attributes: Attributes::default(),
        }
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::from_palette(&ColorPalette::default())
    }
}

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character in this cell, `None` for a blank cell
    pub ch: Option<char>,
    pub foreground: Rgb,
    pub background: Rgb,
    pub attributes: Attributes,
}

impl Cell {
    /// Create a blank cell painted with the given background
    pub fn blank(foreground: Rgb, background: Rgb) -> Self {
        Self {
            ch: None,
            foreground,
            background,
            attributes: Attributes::default(),
        }
    }

    /// Create a cell holding `ch` drawn with `pen`
    pub fn with_pen(ch: char, pen: &Pen) -> Self {
        Self {
            ch: Some(ch),
            foreground: pen.foreground,
            background: pen.background,
            attributes: pen.attributes,
        }
    }

    /// Check if this cell is empty (no content)
    pub fn is_empty(&self) -> bool {
        self.ch.is_none()
    }

    /// Character used when rendering the cell as plain text
    pub fn display_char(&self) -> char {
        self.ch.unwrap_or(' ')
    }
}
