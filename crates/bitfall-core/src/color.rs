//! Color handling for glyphs and backgrounds.

use std::fmt;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// An opaque 24-bit color, written as `#rrggbb` in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// Default glyph color, a terminal-friendly phosphor green.
    pub const PHOSPHOR: Rgb = Rgb::new(0, 204, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn parse_hex(s: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Composite this color over `background` with the given alpha (0-255).
    ///
    /// Terminals have no per-cell transparency, so glyph alpha is resolved
    /// against the known background color instead.
    pub fn over(self, background: Rgb, alpha: u8) -> Rgb {
        let a = alpha as u16;
        let mix = |fg: u8, bg: u8| ((fg as u16 * a + bg as u16 * (255 - a) + 127) / 255) as u8;
        Rgb::new(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Self {
        Color::Rgb(value.r, value.g, value.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse_hex("#00ff7f"), Ok(Rgb::new(0, 255, 127)));
        assert_eq!(Rgb::parse_hex("102030"), Ok(Rgb::new(16, 32, 48)));
        assert!(Rgb::parse_hex("#fff").is_err());
        assert!(Rgb::parse_hex("#gg0000").is_err());
        assert!(Rgb::parse_hex("#ａｂｃ").is_err());
        assert!(Rgb::parse_hex("#+1+2+3").is_err());
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        assert_eq!(Rgb::new(255, 0, 171).to_string(), "#ff00ab");
    }

    #[test]
    fn test_over_background() {
        let fg = Rgb::new(200, 100, 0);
        assert_eq!(fg.over(Rgb::BLACK, 255), fg);
        assert_eq!(fg.over(Rgb::BLACK, 0), Rgb::BLACK);

        let half = fg.over(Rgb::BLACK, 128);
        assert_eq!(half, Rgb::new(100, 50, 0));
    }
}
