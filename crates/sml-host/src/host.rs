//! Host capabilities the launcher core depends on
//!
//! The registry never talks to a package manager directly. Everything it needs
//! (profiles, activities, shortcuts, icons, change notifications) comes through
//! [`LauncherHost`], which the surrounding application injects.

use std::fmt;

use serde::Serialize;
use sml_core::prelude::*;
use sml_core::{ActivityInfo, IconHandle, ProfileHandle, ShortcutInfo};
use tokio::sync::mpsc;

/// Change notifications that invalidate the application list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum HostChange {
    PackageAdded {
        package_name: String,
        user: ProfileHandle,
    },
    PackageRemoved {
        package_name: String,
        user: ProfileHandle,
    },
    PackageChanged {
        package_name: String,
        user: ProfileHandle,
    },
    /// Packages on removable storage became available
    PackagesAvailable {
        package_names: Vec<String>,
        user: ProfileHandle,
        replacing: bool,
    },
    PackagesUnavailable {
        package_names: Vec<String>,
        user: ProfileHandle,
        replacing: bool,
    },
    ProfileAvailable {
        user: ProfileHandle,
    },
    ProfileUnavailable {
        user: ProfileHandle,
    },
    ProfileUnlocked {
        user: ProfileHandle,
    },
}

impl HostChange {
    pub fn user(&self) -> ProfileHandle {
        match self {
            HostChange::PackageAdded { user, .. }
            | HostChange::PackageRemoved { user, .. }
            | HostChange::PackageChanged { user, .. }
            | HostChange::PackagesAvailable { user, .. }
            | HostChange::PackagesUnavailable { user, .. }
            | HostChange::ProfileAvailable { user }
            | HostChange::ProfileUnavailable { user }
            | HostChange::ProfileUnlocked { user } => *user,
        }
    }

    pub fn is_profile_change(&self) -> bool {
        matches!(
            self,
            HostChange::ProfileAvailable { .. }
                | HostChange::ProfileUnavailable { .. }
                | HostChange::ProfileUnlocked { .. }
        )
    }
}

/// Sender half handed to the host when registering for changes
pub type ChangeSender = mpsc::UnboundedSender<HostChange>;

/// Registration handle; unregisters the listener when dropped
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to unregister
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Package manager and launcher services provided by the platform
#[trait_variant::make(LauncherHost: Send)]
pub trait LocalLauncherHost {
    /// Active user profiles; `Error::Unsupported` when the platform cannot
    /// enumerate per profile
    async fn list_user_profiles(&self) -> Result<Vec<ProfileHandle>>;

    /// Launchable activities for one profile
    async fn list_activities(&self, profile: ProfileHandle) -> Result<Vec<ActivityInfo>>;

    /// Shortcuts published by a package; may fail with `PermissionDenied`
    async fn query_shortcuts(
        &self,
        package_name: &str,
        profile: ProfileHandle,
    ) -> Result<Vec<ShortcutInfo>>;

    async fn load_icon(
        &self,
        activity: &ActivityInfo,
        profile: ProfileHandle,
        density: u32,
    ) -> Result<IconHandle>;

    fn load_shortcut_icon(&self, shortcut: &ShortcutInfo, density: u32) -> Result<IconHandle>;

    /// Label decorated for display in `profile`
    fn badged_label(&self, label: &str, profile: ProfileHandle) -> String;

    /// The launcher's own package, excluded from enumeration
    fn host_package_name(&self) -> &str;

    fn observe_package_changes(&self, tx: ChangeSender) -> Result<Subscription>;

    fn observe_profile_availability(&self, tx: ChangeSender) -> Result<Subscription>;
}
