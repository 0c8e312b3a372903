//! Color type definitions and background colors.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// PNG color types understood by the decoder.
///
/// Grayscale+alpha (4) is a valid PNG color type but outside the supported
/// subset, so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorType {
    /// Grayscale, 1 sample per pixel.
    Gray = 0,
    /// RGB, 3 samples per pixel.
    Rgb = 2,
    /// Palette index, 1 sample per pixel.
    Indexed = 3,
    /// RGBA, 4 samples per pixel.
    Rgba = 6,
}

impl ColorType {
    /// Returns the number of bytes per pixel at bit depth 8.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            ColorType::Gray => 1,
            ColorType::Rgb => 3,
            ColorType::Indexed => 1,
            ColorType::Rgba => 4,
        }
    }

    /// Returns the PNG color type value.
    #[inline]
    pub const fn png_color_type(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ColorType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(ColorType::Gray),
            2 => Ok(ColorType::Rgb),
            3 => Ok(ColorType::Indexed),
            6 => Ok(ColorType::Rgba),
            4 => Err(Error::UnsupportedFormat(
                "grayscale+alpha color type".into(),
            )),
            _ => Err(Error::UnsupportedFormat(format!(
                "invalid PNG color type: {value}"
            ))),
        }
    }
}

/// An opaque RGB color, used as a flatten background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    /// Pure black.
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    /// Construct from components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components as an array, in R, G, B order.
    #[inline]
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color {0:?}: expected #rrggbb or #rgb")]
pub struct ParseRgbError(String);

impl FromStr for Rgb {
    type Err = ParseRgbError;

    /// Parses `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRgbError(s.to_string());
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }

        let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map_err(|_| err());
        match hex.len() {
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
                Ok(Rgb::new(byte(0)?, byte(2)?, byte(4)?))
            }
            // #abc expands to #aabbcc
            3 => Ok(Rgb::new(
                nibble(0)? * 0x11,
                nibble(1)? * 0x11,
                nibble(2)? * 0x11,
            )),
            _ => Err(err()),
        }
    }
}
