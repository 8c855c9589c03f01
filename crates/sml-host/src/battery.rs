//! Battery readings from the Linux power-supply class
//!
//! Reads `/sys/class/power_supply/*`: the first supply whose `type` is
//! `Battery` provides the charge, and any online `Mains`, `USB` or `Wireless`
//! supply provides the plug source.

use std::fs;
use std::path::{Path, PathBuf};

use sml_core::prelude::*;
use sml_core::{BatteryHealth, BatteryStats, BatteryStatus, PlugSource};

/// Default sysfs power-supply directory
pub const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Battery source backed by a power-supply directory tree
#[derive(Debug, Clone)]
pub struct SysfsBattery {
    root: PathBuf,
}

impl Default for SysfsBattery {
    fn default() -> Self {
        Self::new(POWER_SUPPLY_ROOT)
    }
}

impl SysfsBattery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current reading; a machine without a battery reports `present = false`
    pub fn read_stats(&self) -> Result<BatteryStats> {
        let supplies = self.supplies()?;

        let mut stats = BatteryStats::default();
        if let Some(battery) = supplies.iter().find(|s| s.kind == "Battery") {
            stats = read_battery(&battery.path);
        }
        stats.plugged = supplies
            .iter()
            .filter(|s| read_attr(&s.path, "online").as_deref() == Some("1"))
            .find_map(|s| plug_source(&s.kind))
            .unwrap_or(PlugSource::Unplugged);

        trace!("Battery reading: {}", stats);
        Ok(stats)
    }

    /// Design capacity in mAh, `None` if the battery does not report it
    pub fn design_capacity_mah(&self) -> Option<u32> {
        let supplies = self.supplies().ok()?;
        let battery = supplies.iter().find(|s| s.kind == "Battery")?;
        let micro_amp_hours: u64 = read_attr(&battery.path, "charge_full_design")?
            .parse()
            .ok()?;
        u32::try_from(micro_amp_hours / 1000).ok()
    }

    fn supplies(&self) -> Result<Vec<Supply>> {
        if !self.root.exists() {
            debug!("No power supply directory at {:?}", self.root);
            return Ok(Vec::new());
        }

        let mut supplies = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if let Some(kind) = read_attr(&path, "type") {
                supplies.push(Supply { path, kind });
            }
        }
        supplies.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(supplies)
    }
}

#[derive(Debug)]
struct Supply {
    path: PathBuf,
    kind: String,
}

fn read_attr(dir: &Path, name: &str) -> Option<String> {
    fs::read_to_string(dir.join(name))
        .ok()
        .map(|value| value.trim().to_string())
}

fn read_int(dir: &Path, name: &str) -> Option<i64> {
    read_attr(dir, name)?.parse().ok()
}

fn read_battery(dir: &Path) -> BatteryStats {
    BatteryStats {
        // a battery without a `present` attribute is assumed present
        present: read_attr(dir, "present").map_or(true, |p| p == "1"),
        level: read_int(dir, "capacity").unwrap_or(0) as i32,
        scale: 100,
        status: read_attr(dir, "status")
            .map(|s| BatteryStatus::from_sysfs(&s))
            .unwrap_or_default(),
        health: read_attr(dir, "health")
            .map(|s| BatteryHealth::from_sysfs(&s))
            .unwrap_or_default(),
        plugged: PlugSource::Unplugged,
        temperature: read_int(dir, "temp").unwrap_or(0) as i32,
        // microvolts to millivolts
        voltage: (read_int(dir, "voltage_now").unwrap_or(0) / 1000) as i32,
        technology: read_attr(dir, "technology"),
    }
}

fn plug_source(kind: &str) -> Option<PlugSource> {
    match kind {
        "Mains" => Some(PlugSource::Ac),
        "USB" | "USB_C" | "USB_PD" => Some(PlugSource::Usb),
        "Wireless" => Some(PlugSource::Wireless),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_supply(root: &Path, name: &str, attrs: &[(&str, &str)]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for (attr, value) in attrs {
            fs::write(dir.join(attr), format!("{}\n", value)).unwrap();
        }
    }

    #[test]
    fn test_reads_battery_and_plug_source() {
        let temp = TempDir::new().unwrap();
        write_supply(
            temp.path(),
            "BAT0",
            &[
                ("type", "Battery"),
                ("present", "1"),
                ("capacity", "64"),
                ("status", "Charging"),
                ("health", "Good"),
                ("temp", "312"),
                ("voltage_now", "12034000"),
                ("technology", "Li-ion"),
                ("charge_full_design", "4200000"),
            ],
        );
        write_supply(temp.path(), "AC", &[("type", "Mains"), ("online", "1")]);

        let source = SysfsBattery::new(temp.path());
        let stats = source.read_stats().unwrap();

        assert_eq!(stats.meter_input(), (Some(64), true));
        assert_eq!(stats.plugged, PlugSource::Ac);
        assert_eq!(stats.health, BatteryHealth::Good);
        assert_eq!(stats.voltage, 12034);
        assert_eq!(stats.temperature, 312);
        assert_eq!(stats.technology.as_deref(), Some("Li-ion"));
        assert_eq!(source.design_capacity_mah(), Some(4200));
    }

    #[test]
    fn test_offline_charger_is_unplugged() {
        let temp = TempDir::new().unwrap();
        write_supply(
            temp.path(),
            "BAT1",
            &[("type", "Battery"), ("capacity", "90"), ("status", "Discharging")],
        );
        write_supply(temp.path(), "ucsi-source-psy", &[("type", "USB"), ("online", "0")]);

        let stats = SysfsBattery::new(temp.path()).read_stats().unwrap();
        assert_eq!(stats.plugged, PlugSource::Unplugged);
        assert_eq!(stats.meter_input(), (Some(90), false));
    }

    #[test]
    fn test_no_battery_reports_unknown_level() {
        let temp = TempDir::new().unwrap();
        write_supply(temp.path(), "AC", &[("type", "Mains"), ("online", "1")]);

        let source = SysfsBattery::new(temp.path());
        let stats = source.read_stats().unwrap();
        assert!(!stats.present);
        assert_eq!(stats.meter_input(), (None, false));
        assert_eq!(source.design_capacity_mah(), None);
    }

    #[test]
    fn test_missing_root_is_not_an_error() {
        let source = SysfsBattery::new("/nonexistent/power_supply");
        assert!(source.read_stats().is_ok());
    }
}
