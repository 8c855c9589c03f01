//! Configuration types for smlauncher
//!
//! Defines:
//! - `Settings` - Global launcher settings (`config.toml`)
//! - `LauncherSettings` - Registry and host options
//! - `BatterySettings` - Battery meter appearance

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sml_core::prelude::*;
use sml_core::Color;
use sml_meter::{BatteryMeter, BatteryState, MeterColors, Theme, CRITICAL_CHARGE_LEVEL};

/// Baseline screen density in dpi
pub const DEFAULT_ICON_DENSITY: u32 = 160;

/// Launcher settings (`config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub launcher: LauncherSettings,

    #[serde(default)]
    pub battery: BatterySettings,
}

/// Application registry settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LauncherSettings {
    /// The launcher's own package, never listed
    #[serde(default = "default_host_package")]
    pub host_package: String,

    /// Density passed to icon loading
    #[serde(default = "default_icon_density")]
    pub icon_density: u32,

    /// Extra desktop-entry directories, searched before the XDG defaults
    #[serde(default)]
    pub application_dirs: Vec<PathBuf>,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            host_package: default_host_package(),
            icon_density: default_icon_density(),
            application_dirs: Vec::new(),
        }
    }
}

/// Battery meter settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BatterySettings {
    #[serde(default)]
    pub theme: Theme,

    /// Show the alert glyph at or below `critical_level`
    #[serde(default = "default_true")]
    pub critical_alert: bool,

    #[serde(default = "default_critical_level")]
    pub critical_level: i32,

    #[serde(default = "default_color")]
    pub color: Color,

    #[serde(default = "default_indicator_color")]
    pub indicator_color: Color,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charging_color: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_color: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_color: Option<Color>,

    #[serde(default = "default_intrinsic_size")]
    pub intrinsic_size: i32,
}

impl Default for BatterySettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            critical_alert: true,
            critical_level: default_critical_level(),
            color: default_color(),
            indicator_color: default_indicator_color(),
            charging_color: None,
            critical_color: None,
            unknown_color: None,
            intrinsic_size: default_intrinsic_size(),
        }
    }
}

impl BatterySettings {
    pub fn colors(&self) -> MeterColors {
        MeterColors {
            color: self.color,
            indicator_color: self.indicator_color,
            charging_color: self.charging_color,
            critical_color: self.critical_color,
            unknown_color: self.unknown_color,
        }
    }

    /// Initial meter state; the charge stays unknown until a reading arrives
    pub fn state(&self) -> BatteryState {
        let critical = self.critical_alert.then_some(self.critical_level);
        BatteryState::default()
            .with_critical_level(critical)
            .with_colors(self.colors())
            .with_theme(self.theme)
    }

    /// A meter configured from these settings
    pub fn meter(&self) -> Result<BatteryMeter> {
        let mut meter = BatteryMeter::new(self.theme)?.with_intrinsic_size(self.intrinsic_size);
        meter.apply_state(self.state())?;
        Ok(meter)
    }
}

fn default_host_package() -> String {
    "smlauncher".to_string()
}

fn default_icon_density() -> u32 {
    DEFAULT_ICON_DENSITY
}

fn default_true() -> bool {
    true
}

fn default_critical_level() -> i32 {
    i32::from(CRITICAL_CHARGE_LEVEL)
}

fn default_color() -> Color {
    Color::WHITE
}

fn default_indicator_color() -> Color {
    Color::TRANSPARENT
}

fn default_intrinsic_size() -> i32 {
    sml_meter::DEFAULT_INTRINSIC_SIZE
}
