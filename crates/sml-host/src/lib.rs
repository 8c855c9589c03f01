//! # sml-host - Host Platform Services
//!
//! The package manager, profile, icon and battery services the launcher core
//! consumes, plus a desktop implementation backed by XDG desktop entries and
//! the Linux power-supply class.
//!
//! Depends on [`sml_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Host Abstraction
//! - [`LauncherHost`] - Profiles, activities, shortcuts, icons and change listeners
//! - [`HostChange`] - Package and profile change notifications
//! - [`Subscription`] - Listener registration, cancelled on drop
//!
//! ### Desktop Implementation
//! - [`DesktopHost`] - [`LauncherHost`] over `*.desktop` files
//! - [`parse_desktop_entry()`] - Parse one desktop entry
//! - [`default_application_dirs()`] - XDG application search path
//!
//! ### Platform Probing
//! - [`PlatformCapabilities`] - Optional features, resolved once
//! - [`SysfsBattery`] - Battery readings from `/sys/class/power_supply`

pub mod battery;
pub mod capabilities;
pub mod desktop;
pub mod host;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

// Public API re-exports
pub use battery::{SysfsBattery, POWER_SUPPLY_ROOT};
pub use capabilities::{PlatformCapabilities, StatusBarSupport};
pub use desktop::{
    change_for, default_application_dirs, icon_size_for_density, parse_desktop_entry,
    DesktopAction, DesktopEntry, DesktopHost, DesktopHostConfig, DEFAULT_DEBOUNCE_MS,
};
pub use host::{ChangeSender, HostChange, LauncherHost, LocalLauncherHost, Subscription};
