//! Bundled shape themes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sml_core::prelude::*;

use crate::shape_data::ShapeData;

const ROUNDED: &[u8] = include_bytes!("../assets/battery_shapes_rounded.bin");
const SHARP: &[u8] = include_bytes!("../assets/battery_shapes_sharp.bin");

/// Selectable battery outline style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Rounded,
    #[default]
    Sharp,
}

impl Theme {
    /// Raw bytes of the bundled shape resource
    pub fn resource(&self) -> &'static [u8] {
        match self {
            Theme::Rounded => ROUNDED,
            Theme::Sharp => SHARP,
        }
    }

    pub fn load(&self) -> Result<ShapeData> {
        ShapeData::decode(self.resource())
            .with_context(|| format!("Failed to decode the {} battery theme", self))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Rounded => f.write_str("rounded"),
            Theme::Sharp => f.write_str("sharp"),
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rounded" => Ok(Theme::Rounded),
            "sharp" => Ok(Theme::Sharp),
            other => Err(Error::config(format!("unknown battery theme '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape_data::{encode, ShapeBlock, ShapeCommand, ShapeSource};
    use crate::shapes::{LiteralShapes, ALERT, BATTERY, CHARGING, UNKNOWN};

    #[test]
    fn test_bundled_themes_decode() {
        for theme in [Theme::Rounded, Theme::Sharp] {
            let data = theme.load().unwrap();
            assert_eq!(data.aspect_ratio(), 0.5);
            for block in ShapeBlock::ALL {
                assert!(data.commands(block).count() > 0, "{theme} {block}");
            }
        }
    }

    #[test]
    fn test_rounded_resource_matches_literal_tables() {
        let expected = encode(
            LiteralShapes::ASPECT_RATIO,
            [BATTERY, ALERT, CHARGING, UNKNOWN],
        );
        assert_eq!(Theme::Rounded.resource(), expected.as_slice());

        let data = Theme::Rounded.load().unwrap();
        for block in ShapeBlock::ALL {
            let decoded: Vec<ShapeCommand> = data.commands(block).collect();
            let literal: Vec<ShapeCommand> = LiteralShapes.commands(block).collect();
            assert_eq!(decoded, literal, "{block}");
        }
    }

    #[test]
    fn test_theme_names() {
        assert_eq!("Rounded".parse::<Theme>().unwrap(), Theme::Rounded);
        assert_eq!(Theme::Sharp.to_string(), "sharp");
        assert!("square".parse::<Theme>().is_err());
        assert_eq!(Theme::default(), Theme::Sharp);
    }
}
