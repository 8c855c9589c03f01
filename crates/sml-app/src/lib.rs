//! sml-app - Application registry, preferences and orchestration for smlauncher
//!
//! This crate owns the live application registry, the persisted hidden-app
//! preference and the filtered drawer list built from both, plus
//! configuration loading and the [`LauncherContext`] that wires them together.

pub mod config;
pub mod context;
pub mod feed;
pub mod filter;
pub mod preferences;
pub mod registry;

// Re-export primary types
pub use config::Settings;
pub use context::LauncherContext;
pub use feed::{DrawerFeed, DrawerList};
pub use filter::{hide_list_rows, visible_apps, AppListFilter, HideListRow};
pub use preferences::{PreferenceStore, HIDE_APPS};
pub use registry::{AppSnapshot, AppsObserver, CycleFailure, LiveApps, LiveAppsConfig};

// Re-export host types used in the public API
pub use sml_host::{DesktopHost, LauncherHost, PlatformCapabilities};
