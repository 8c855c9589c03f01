//! Platform capabilities resolved once at startup
//!
//! Optional platform features are detected a single time and recorded here.
//! Callers check the record instead of probing per call, and unsupported
//! features report [`Error::Unsupported`].

use serde::Serialize;
use sml_core::prelude::*;

use crate::battery::SysfsBattery;

/// Whether the status bar can be pulled down programmatically
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBarSupport {
    Expandable,
    #[default]
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformCapabilities {
    /// Activities can be listed per user profile
    pub per_profile_enumeration: bool,
    /// Packages can publish launcher shortcuts
    pub shortcuts: bool,
    /// Battery design capacity in mAh; `None` when not reported
    pub battery_design_capacity: Option<u32>,
    pub status_bar: StatusBarSupport,
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self::unsupported()
    }
}

impl PlatformCapabilities {
    /// Nothing optional is available
    pub const fn unsupported() -> Self {
        Self {
            per_profile_enumeration: false,
            shortcuts: false,
            battery_design_capacity: None,
            status_bar: StatusBarSupport::Unsupported,
        }
    }

    /// Probe a Linux desktop: a single profile, desktop actions as
    /// shortcuts, battery capacity from sysfs and no status bar control
    pub fn detect_desktop(battery: &SysfsBattery) -> Self {
        let capabilities = Self {
            per_profile_enumeration: false,
            shortcuts: true,
            battery_design_capacity: battery.design_capacity_mah(),
            status_bar: StatusBarSupport::Unsupported,
        };
        debug!("Resolved platform capabilities: {:?}", capabilities);
        capabilities
    }

    pub fn battery_design_capacity(&self) -> Result<u32> {
        self.battery_design_capacity
            .ok_or_else(|| Error::unsupported("battery design capacity"))
    }

    pub fn expand_status_bar(&self) -> Result<()> {
        match self.status_bar {
            StatusBarSupport::Expandable => Ok(()),
            StatusBarSupport::Unsupported => Err(Error::unsupported("status bar expansion")),
        }
    }
}
