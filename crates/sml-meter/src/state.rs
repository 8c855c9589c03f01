//! Battery meter input state

use serde::{Deserialize, Serialize};
use sml_core::Color;

use crate::shape_data::ShapeBlock;
use crate::theme::Theme;

pub const MINIMUM_CHARGE_LEVEL: u8 = 0;
pub const MAXIMUM_CHARGE_LEVEL: u8 = 100;
pub const CRITICAL_CHARGE_LEVEL: u8 = 10;

/// Clamp a raw level into `0..=100`, keeping "unknown" distinct from 0
pub fn clamp_level(level: Option<i32>) -> Option<u8> {
    level.map(|value| {
        value.clamp(
            i32::from(MINIMUM_CHARGE_LEVEL),
            i32::from(MAXIMUM_CHARGE_LEVEL),
        ) as u8
    })
}

/// Colors the meter paints with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterColors {
    /// Base color for the fill and the translucent body
    pub color: Color,
    /// Color of the overlay glyph
    pub indicator_color: Color,
    pub charging_color: Option<Color>,
    pub critical_color: Option<Color>,
    pub unknown_color: Option<Color>,
}

impl Default for MeterColors {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            indicator_color: Color::TRANSPARENT,
            charging_color: None,
            critical_color: None,
            unknown_color: None,
        }
    }
}

/// Which overlay glyph is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    None,
    Unknown,
    Charging,
    Alert,
}

impl Indicator {
    pub fn block(&self) -> Option<ShapeBlock> {
        match self {
            Indicator::None => None,
            Indicator::Unknown => Some(ShapeBlock::Unknown),
            Indicator::Charging => Some(ShapeBlock::Charging),
            Indicator::Alert => Some(ShapeBlock::Alert),
        }
    }
}

/// Everything the meter geometry and paints are derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryState {
    /// `None` means the charge is unknown
    pub charge_level: Option<u8>,
    /// `None` disables the critical alert
    pub critical_level: Option<u8>,
    pub charging: bool,
    pub colors: MeterColors,
    pub theme: Theme,
}

impl Default for BatteryState {
    fn default() -> Self {
        Self {
            charge_level: None,
            critical_level: Some(CRITICAL_CHARGE_LEVEL),
            charging: false,
            colors: MeterColors::default(),
            theme: Theme::default(),
        }
    }
}

impl BatteryState {
    pub fn with_charge_level(mut self, level: Option<i32>) -> Self {
        self.charge_level = clamp_level(level);
        self
    }

    pub fn with_critical_level(mut self, level: Option<i32>) -> Self {
        self.critical_level = clamp_level(level);
        self
    }

    pub fn with_charging(mut self, charging: bool) -> Self {
        self.charging = charging;
        self
    }

    pub fn with_colors(mut self, colors: MeterColors) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Clamp both levels into range
    pub fn clamped(mut self) -> Self {
        self.charge_level = self.charge_level.map(|l| l.min(MAXIMUM_CHARGE_LEVEL));
        self.critical_level = self.critical_level.map(|l| l.min(MAXIMUM_CHARGE_LEVEL));
        self
    }

    pub fn is_critical(&self) -> bool {
        matches!(
            (self.charge_level, self.critical_level),
            (Some(level), Some(critical)) if level <= critical
        )
    }

    /// Unknown beats charging, charging beats critical
    pub fn indicator(&self) -> Indicator {
        if self.charge_level.is_none() {
            Indicator::Unknown
        } else if self.charging {
            Indicator::Charging
        } else if self.is_critical() {
            Indicator::Alert
        } else {
            Indicator::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_level() {
        assert_eq!(clamp_level(Some(-5)), Some(0));
        assert_eq!(clamp_level(Some(250)), Some(100));
        assert_eq!(clamp_level(Some(42)), Some(42));
        assert_eq!(clamp_level(None), None);
    }

    #[test]
    fn test_unknown_is_distinct_from_zero() {
        let unknown = BatteryState::default();
        let empty = BatteryState::default().with_charge_level(Some(0));
        assert_eq!(unknown.indicator(), Indicator::Unknown);
        // 0 <= default critical level 10
        assert_eq!(empty.indicator(), Indicator::Alert);
    }

    #[test]
    fn test_indicator_precedence() {
        let base = BatteryState::default().with_critical_level(Some(15));

        let unknown_charging = base.clone().with_charging(true);
        assert_eq!(unknown_charging.indicator(), Indicator::Unknown);

        let charging_critical = base.clone().with_charge_level(Some(5)).with_charging(true);
        assert_eq!(charging_critical.indicator(), Indicator::Charging);

        let critical = base.clone().with_charge_level(Some(15));
        assert_eq!(critical.indicator(), Indicator::Alert);

        let normal = base.clone().with_charge_level(Some(16));
        assert_eq!(normal.indicator(), Indicator::None);

        let disabled = base.with_critical_level(None).with_charge_level(Some(1));
        assert_eq!(disabled.indicator(), Indicator::None);
    }

    #[test]
    fn test_indicator_for_every_level() {
        for level in 0..=100 {
            for critical in [None, Some(0), Some(15), Some(100)] {
                for charging in [false, true] {
                    let state = BatteryState::default()
                        .with_charge_level(Some(level))
                        .with_critical_level(critical)
                        .with_charging(charging);
                    let expected = if charging {
                        Indicator::Charging
                    } else if critical.is_some_and(|c| level <= c) {
                        Indicator::Alert
                    } else {
                        Indicator::None
                    };
                    assert_eq!(state.indicator(), expected);
                }
            }
        }
    }
}
