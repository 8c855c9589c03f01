//! Packed ARGB colors and opacity scaling
//!
//! Colors are stored the same way the host toolkit passes them around: a single
//! `u32` laid out as `0xAARRGGBB`. Configuration files spell them as
//! `#AARRGGBB` (or `#RRGGBB`, which is taken as fully opaque).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A packed `0xAARRGGBB` color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    pub const fn from_argb_u32(argb: u32) -> Self {
        Self(argb)
    }

    pub const fn from_argb(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self((alpha as u32) << 24 | (red as u32) << 16 | (green as u32) << 8 | blue as u32)
    }

    pub const fn argb(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Keep the RGB channels and scale the alpha channel by `opacity`.
    ///
    /// The new alpha is `round(opacity * alpha)`.
    pub fn with_opacity(self, opacity: Opacity) -> Self {
        let alpha = (opacity.value() * f32::from(self.alpha())).round() as u32;
        Self((self.0 & 0x00FF_FFFF) | (alpha.min(0xFF) << 24))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidColor {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| invalid("expected a leading '#'"))?;

        let value = u32::from_str_radix(hex, 16).map_err(|_| invalid("not a hex number"))?;

        match hex.len() {
            8 => Ok(Self(value)),
            6 => Ok(Self(0xFF00_0000 | value)),
            _ => Err(invalid("expected #RRGGBB or #AARRGGBB")),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A validated opacity factor in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Opacity(f32);

impl Opacity {
    /// Translucency used for the battery body drawn beneath the fill level.
    pub const BATTERY_BODY: Opacity = Opacity(0.3);
    pub const OPAQUE: Opacity = Opacity(1.0);

    pub fn new(value: f32) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidOpacity(value))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        let color = Color::from_argb(0x80, 0x12, 0x34, 0x56);
        assert_eq!(color.argb(), 0x8012_3456);
        assert_eq!(color.alpha(), 0x80);
        assert_eq!(color.red(), 0x12);
        assert_eq!(color.green(), 0x34);
        assert_eq!(color.blue(), 0x56);
    }

    #[test]
    fn test_battery_body_opacity_keeps_rgb() {
        let color = Color::from_argb_u32(0xFF33_66CC);
        let body = color.with_opacity(Opacity::BATTERY_BODY);
        assert_eq!(body.argb() & 0x00FF_FFFF, 0x0033_66CC);
        // round(0.3 * 255) = 77
        assert_eq!(body.alpha(), 77);
    }

    #[test]
    fn test_opacity_scales_existing_alpha() {
        let color = Color::from_argb(100, 1, 2, 3);
        assert_eq!(color.with_opacity(Opacity::BATTERY_BODY).alpha(), 30);
        assert_eq!(color.with_opacity(Opacity::OPAQUE), color);
    }

    #[test]
    fn test_opacity_rejects_out_of_range() {
        assert!(Opacity::new(0.0).is_ok());
        assert!(Opacity::new(1.0).is_ok());
        assert!(matches!(Opacity::new(1.5), Err(Error::InvalidOpacity(_))));
        assert!(Opacity::new(-0.1).is_err());
        assert!(Opacity::new(f32::NAN).is_err());
    }

    #[test]
    fn test_parse_and_display() {
        let color: Color = "#80FF0000".parse().unwrap();
        assert_eq!(color.argb(), 0x80FF_0000);
        assert_eq!(color.to_string(), "#80FF0000");

        let opaque: Color = "#00ff00".parse().unwrap();
        assert_eq!(opaque.argb(), 0xFF00_FF00);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("FF0000".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
        assert!("#FFF".parse::<Color>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::WHITE).unwrap();
        assert_eq!(json, "\"#FFFFFFFF\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::WHITE);
    }
}
