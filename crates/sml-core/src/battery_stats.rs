//! Battery statistics snapshot
//!
//! A point-in-time reading of the power supply. The meter only needs a charge
//! percentage and a charging flag, see [`BatteryStats::meter_input`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Charging status reported by the power supply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryStatus {
    Charging,
    Discharging,
    NotCharging,
    Full,
    #[default]
    Unknown,
}

impl BatteryStatus {
    /// Parse the kernel's `status` attribute
    pub fn from_sysfs(value: &str) -> Self {
        match value.trim() {
            "Charging" => Self::Charging,
            "Discharging" => Self::Discharging,
            "Not charging" => Self::NotCharging,
            "Full" => Self::Full,
            _ => Self::Unknown,
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            Self::Charging => "Charging",
            Self::Discharging => "Discharging",
            Self::NotCharging => "Not Charging",
            Self::Full => "Fully charged",
            Self::Unknown => "Unknown",
        }
    }
}

/// Health reported by the power supply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryHealth {
    Good,
    Overheat,
    Dead,
    OverVoltage,
    Cold,
    Failed,
    #[default]
    Unknown,
}

impl BatteryHealth {
    pub fn from_sysfs(value: &str) -> Self {
        match value.trim() {
            "Good" => Self::Good,
            "Overheat" => Self::Overheat,
            "Dead" => Self::Dead,
            "Over voltage" => Self::OverVoltage,
            "Cold" => Self::Cold,
            "Unspecified failure" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Overheat => "Overheated",
            Self::Dead => "Dead",
            Self::OverVoltage => "Over Voltage",
            Self::Cold => "Cold",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

/// External power source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlugSource {
    #[default]
    Unplugged,
    Ac,
    Usb,
    Wireless,
}

impl PlugSource {
    pub fn display_text(&self) -> &'static str {
        match self {
            Self::Unplugged => "Not plugged",
            Self::Ac => "Plugged by AC",
            Self::Usb => "Plugged by USB",
            Self::Wireless => "Plugged by Wireless",
        }
    }
}

/// One reading of the battery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryStats {
    pub present: bool,
    /// Raw level, out of `scale`
    pub level: i32,
    pub scale: i32,
    pub status: BatteryStatus,
    pub health: BatteryHealth,
    pub plugged: PlugSource,
    /// Tenths of a degree Celsius
    pub temperature: i32,
    /// Millivolts
    pub voltage: i32,
    pub technology: Option<String>,
}

impl Default for BatteryStats {
    fn default() -> Self {
        Self {
            present: false,
            level: 0,
            scale: 100,
            status: BatteryStatus::Unknown,
            health: BatteryHealth::Unknown,
            plugged: PlugSource::Unplugged,
            temperature: 0,
            voltage: 0,
            technology: None,
        }
    }
}

impl BatteryStats {
    /// Charge as a percentage in `0..=100`, or `None` when it cannot be known
    pub fn charge_level(&self) -> Option<u8> {
        if !self.present || self.scale <= 0 {
            return None;
        }
        let percent = (i64::from(self.level) * 100 / i64::from(self.scale)).clamp(0, 100);
        u8::try_from(percent).ok()
    }

    pub fn is_charging(&self) -> bool {
        self.status == BatteryStatus::Charging
    }

    pub fn is_plugged(&self) -> bool {
        self.plugged != PlugSource::Unplugged
    }

    /// The `(charge_level, is_charging)` pair the battery meter consumes
    pub fn meter_input(&self) -> (Option<u8>, bool) {
        (self.charge_level(), self.is_charging())
    }

    pub fn temperature_celsius(&self) -> f64 {
        f64::from(self.temperature) / 10.0
    }

    pub fn temperature_in(&self, fahrenheit: bool) -> f64 {
        let celsius = self.temperature_celsius();
        if fahrenheit {
            celsius * 1.8 + 32.0
        } else {
            celsius
        }
    }

    pub fn temperature_text(&self, fahrenheit: bool) -> String {
        let unit = if fahrenheit { 'F' } else { 'C' };
        format!("{:.1}\u{b0} {}", self.temperature_in(fahrenheit), unit)
    }

    /// Volts
    pub fn voltage_volts(&self) -> f64 {
        f64::from(self.voltage) / 1000.0
    }
}

impl fmt::Display for BatteryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.charge_level() {
            Some(level) => write!(f, "{}% ({})", level, self.status.display_text()),
            None => f.write_str("Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(level: i32, status: BatteryStatus) -> BatteryStats {
        BatteryStats {
            present: true,
            level,
            status,
            ..Default::default()
        }
    }

    #[test]
    fn test_meter_input_charging_only_when_status_charging() {
        assert_eq!(stats(42, BatteryStatus::Charging).meter_input(), (Some(42), true));
        assert_eq!(stats(100, BatteryStatus::Full).meter_input(), (Some(100), false));

        let plugged_not_charging = BatteryStats {
            plugged: PlugSource::Ac,
            ..stats(80, BatteryStatus::NotCharging)
        };
        assert!(plugged_not_charging.is_plugged());
        assert!(!plugged_not_charging.meter_input().1);
    }

    #[test]
    fn test_charge_level_unknown_without_battery() {
        let absent = BatteryStats::default();
        assert_eq!(absent.charge_level(), None);

        let bad_scale = BatteryStats {
            scale: 0,
            ..stats(50, BatteryStatus::Discharging)
        };
        assert_eq!(bad_scale.charge_level(), None);
    }

    #[test]
    fn test_charge_level_scales() {
        let reading = BatteryStats {
            scale: 200,
            ..stats(50, BatteryStatus::Discharging)
        };
        assert_eq!(reading.charge_level(), Some(25));
    }

    #[test]
    fn test_temperature_conversion() {
        let reading = BatteryStats {
            temperature: 250,
            ..Default::default()
        };
        assert_eq!(reading.temperature_in(false), 25.0);
        assert_eq!(reading.temperature_in(true), 77.0);
        assert_eq!(reading.temperature_text(false), "25.0\u{b0} C");
    }

    #[test]
    fn test_sysfs_status_parsing() {
        assert_eq!(BatteryStatus::from_sysfs("Charging\n"), BatteryStatus::Charging);
        assert_eq!(BatteryStatus::from_sysfs("Not charging"), BatteryStatus::NotCharging);
        assert_eq!(BatteryStatus::from_sysfs("???"), BatteryStatus::Unknown);
        assert_eq!(BatteryHealth::from_sysfs("Over voltage").display_text(), "Over Voltage");
    }
}
