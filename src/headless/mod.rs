//! Headless output - NDJSON events on stdout
//!
//! Every command prints its results as newline-delimited JSON, one event per
//! line, each tagged with an `event` field and a millisecond timestamp.
//!
//! # Example Output
//!
//! ```json
//! {"event":"apps","generation":1,"apps":[{"key":"e4d6...","label":"Mail",...}],"timestamp":1704700001000}
//! {"event":"hidden_changed","key":"e4d6...","hidden":true,"changed":true,"timestamp":1704700002000}
//! ```

pub mod runner;

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use sml_app::HideListRow;
use sml_core::{AppInfo, BatteryStats, ProfileHandle};
use sml_meter::{BatteryMeter, MeterGeometry};
use tracing::error;

/// One app as printed by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct AppRow {
    pub key: String,
    pub label: String,
    pub badged_label: String,
    pub package_name: String,
    pub component: String,
    pub user: ProfileHandle,
    pub icon: Option<String>,
    pub shortcuts: Vec<String>,
}

impl From<&AppInfo> for AppRow {
    fn from(app: &AppInfo) -> Self {
        Self {
            key: app.key().to_string(),
            label: app.label.clone(),
            badged_label: app.badged_label.clone(),
            package_name: app.package_name.clone(),
            component: app.name.clone(),
            user: app.user,
            icon: app.icon.as_ref().map(|icon| icon.as_str().to_string()),
            shortcuts: app
                .shortcuts
                .iter()
                .map(|shortcut| shortcut.short_label.clone())
                .collect(),
        }
    }
}

/// Events emitted by the CLI
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Visible apps from one registry cycle
    Apps {
        generation: u64,
        apps: Vec<AppRow>,
        timestamp: i64,
    },

    /// Every app with its hidden flag
    HideList {
        rows: Vec<HideListRow>,
        timestamp: i64,
    },

    /// Result of a hide or unhide request
    HiddenChanged {
        key: String,
        hidden: bool,
        changed: bool,
        timestamp: i64,
    },

    /// Current hidden-app keys
    Hidden { keys: Vec<String>, timestamp: i64 },

    /// Battery reading with the meter geometry and draw list derived from it
    Battery {
        stats: BatteryStats,
        geometry: MeterGeometry,
        draw: serde_json::Value,
        timestamp: i64,
    },

    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },

    Stopped { reason: String, timestamp: i64 },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn apps<'a>(generation: u64, apps: impl IntoIterator<Item = &'a AppInfo>) -> Self {
        Self::Apps {
            generation,
            apps: apps.into_iter().map(AppRow::from).collect(),
            timestamp: Self::now(),
        }
    }

    pub fn hide_list(rows: Vec<HideListRow>) -> Self {
        Self::HideList {
            rows,
            timestamp: Self::now(),
        }
    }

    pub fn hidden_changed(key: &str, hidden: bool, changed: bool) -> Self {
        Self::HiddenChanged {
            key: key.to_string(),
            hidden,
            changed,
            timestamp: Self::now(),
        }
    }

    pub fn hidden(keys: impl IntoIterator<Item = String>) -> Self {
        Self::Hidden {
            keys: keys.into_iter().collect(),
            timestamp: Self::now(),
        }
    }

    pub fn battery(stats: BatteryStats, meter: &BatteryMeter) -> Self {
        let draw = serde_json::to_value(meter.draw()).unwrap_or_else(|e| {
            error!("Failed to serialize draw list: {}", e);
            serde_json::Value::Null
        });
        Self::Battery {
            stats,
            geometry: meter.geometry().clone(),
            draw,
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }

    pub fn stopped(reason: &str) -> Self {
        Self::Stopped {
            reason: reason.to_string(),
            timestamp: Self::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sml_core::{ActivityInfo, IconHandle, Rect};
    use sml_meter::Theme;

    #[test]
    fn test_apps_serialization() {
        let app = AppInfo::new(
            ActivityInfo::new("org.example.mail", "org.example.mail.Inbox", "Mail"),
            ProfileHandle::primary(),
        )
        .with_icon(Some(IconHandle::new("mail@48")));
        let event = HeadlessEvent::apps(3, [&app]);
        let value = serde_json::to_value(&event).expect("serialization failed");

        assert_eq!(value["event"], "apps");
        assert_eq!(value["generation"], 3);
        assert_eq!(value["apps"][0]["key"], "e4d6aa94afabb479f855d037bc495da8");
        assert_eq!(value["apps"][0]["icon"], "mail@48");
        assert!(value["timestamp"].is_number());
    }

    #[test]
    fn test_hidden_changed_serialization() {
        let event = HeadlessEvent::hidden_changed("abc", true, false);
        let value = serde_json::to_value(&event).expect("serialization failed");

        assert_eq!(value["event"], "hidden_changed");
        assert_eq!(value["key"], "abc");
        assert_eq!(value["hidden"], true);
        assert_eq!(value["changed"], false);
    }

    #[test]
    fn test_battery_serialization() {
        let mut meter = BatteryMeter::new(Theme::Sharp).expect("bundled theme decodes");
        meter.set_bounds(Rect::new(0, 0, 24, 48));
        meter.set_charge_level(Some(50));

        let event = HeadlessEvent::battery(BatteryStats::default(), &meter);
        let value = serde_json::to_value(&event).expect("serialization failed");

        assert_eq!(value["event"], "battery");
        assert_eq!(value["geometry"]["indicator_kind"], "none");
        assert_eq!(value["draw"][0]["op"], "save");
    }

    #[test]
    fn test_error_serialization() {
        let event = HeadlessEvent::error("No config dir".to_string(), true);
        let value = serde_json::to_value(&event).expect("serialization failed");
        assert_eq!(value["event"], "error");
        assert_eq!(value["fatal"], true);
    }
}
