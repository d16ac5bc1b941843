//! Colors
//!
//! Every color the core hands out is a fully resolved RGB triplet. Palette
//! lookups (ANSI, 256-color cube, grayscale ramp) happen when an SGR sequence
//! is scanned, so later stages never see an indexed or "default" color.

use serde::{Deserialize, Serialize};

/// A 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from channels of arbitrary precision.
    ///
    /// `max` is the largest value a channel can take in the source encoding
    /// (255 for SGR truecolor, 65535 for 16-bit X11 specs). Values above `max`
    /// are clamped.
    pub fn normalized(r: u32, g: u32, b: u32, max: u32) -> Self {
        let scale = |c: u32| -> u8 {
            if max == 0 {
                return 0;
            }
            let c = c.min(max) as u64;
            ((c * 255 + max as u64 / 2) / max as u64) as u8
        };
        Self::new(scale(r), scale(g), scale(b))
    }

    /// Build a color from 8-bit channels that may have arrived out of range.
    pub fn clamped(r: u32, g: u32, b: u32) -> Self {
        Self::normalized(r, g, b, 255)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Rgb::new(r, g, b)
    }
}

/// Color palette used to resolve SGR color codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    /// Default foreground color
    pub foreground: Rgb,
    /// Default background color
    pub background: Rgb,
    /// The 16 ANSI colors (0-15)
    pub ansi: [Rgb; 16],
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            foreground: Rgb::WHITE,
            background: Rgb::BLACK,
            // Default ANSI colors (similar to xterm)
            ansi: [
                Rgb::new(0, 0, 0),       // 0: Black
                Rgb::new(205, 0, 0),     // 1: Red
                Rgb::new(0, 205, 0),     // 2: Green
                Rgb::new(205, 205, 0),   // 3: Yellow
                Rgb::new(0, 0, 238),     // 4: Blue
                Rgb::new(205, 0, 205),   // 5: Magenta
                Rgb::new(0, 205, 205),   // 6: Cyan
                Rgb::new(229, 229, 229), // 7: White
                Rgb::new(127, 127, 127), // 8: Bright Black
                Rgb::new(255, 0, 0),     // 9: Bright Red
                Rgb::new(0, 255, 0),     // 10: Bright Green
                Rgb::new(255, 255, 0),   // 11: Bright Yellow
                Rgb::new(92, 92, 255),   // 12: Bright Blue
                Rgb::new(255, 0, 255),   // 13: Bright Magenta
                Rgb::new(0, 255, 255),   // 14: Bright Cyan
                Rgb::new(255, 255, 255), // 15: Bright White
            ],
        }
    }
}

impl ColorPalette {
    /// Get the RGB color for an indexed color (0-255)
    pub fn indexed(&self, index: u8) -> Rgb {
        match index {
            // ANSI colors
            0..=15 => self.ansi[index as usize],
            // 216 color cube (16-231)
            16..=231 => {
                let n = index - 16;
                let b = n % 6;
                let g = (n / 6) % 6;
                let r = n / 36;
                let to_component = |c: u8| if c == 0 { 0 } else { 55 + c * 40 };
                Rgb::new(to_component(r), to_component(g), to_component(b))
            },
            // Grayscale (232-255)
            232..=255 => {
                let gray = 8 + (index - 232) * 10;
                Rgb::new(gray, gray, gray)
            },
        }
    }
}
