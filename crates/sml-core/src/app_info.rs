//! Launchable application descriptors
//!
//! An [`AppInfo`] describes one launchable activity for one user profile. It is
//! built fresh on every enumeration pass and never mutated afterwards, except
//! for two lazily filled caches: the [`AppKey`] and the shortcut icons.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A user profile on the device (the primary user or a managed/work profile)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProfileHandle {
    pub id: u32,
    /// Managed (work) profiles get badged labels
    pub managed: bool,
}

impl ProfileHandle {
    pub const fn primary() -> Self {
        Self {
            id: 0,
            managed: false,
        }
    }

    pub const fn managed(id: u32) -> Self {
        Self { id, managed: true }
    }
}

/// Opaque handle to an icon image owned by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconHandle(Arc<str>);

impl IconHandle {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A launchable activity as reported by the host package manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub package_name: String,
    /// Fully qualified component (activity) name
    pub name: String,
    pub label: String,
}

impl ActivityInfo {
    pub fn new(
        package_name: impl Into<String>,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            name: name.into(),
            label: label.into(),
        }
    }
}

/// An app shortcut (dynamic, manifest or pinned)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutInfo {
    pub id: String,
    pub package_name: String,
    pub short_label: String,
    #[serde(default)]
    pub long_label: Option<String>,
}

impl ShortcutInfo {
    pub fn new(
        id: impl Into<String>,
        package_name: impl Into<String>,
        short_label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            package_name: package_name.into(),
            short_label: short_label.into(),
            long_label: None,
        }
    }
}

/// Stable identity of an app across enumerations.
///
/// Hex encoded MD5 of `"<packageName>@<componentName>"`. It does not depend on
/// the label, the icon or the profile, so persisted hide-lists survive reloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppKey(String);

impl AppKey {
    pub fn for_component(package_name: &str, name: &str) -> Self {
        let digest = Md5::digest(format!("{}@{}", package_name, name).as_bytes());
        let hex = digest.iter().map(|b| format!("{:02x}", b)).collect();
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AppKey> for String {
    fn from(key: AppKey) -> Self {
        key.0
    }
}

/// One launchable activity for one user profile
#[derive(Debug)]
pub struct AppInfo {
    pub icon: Option<IconHandle>,
    pub label: String,
    /// Label decorated for display in a secondary profile
    pub badged_label: String,
    pub package_name: String,
    /// Component (activity) name
    pub name: String,
    pub user: ProfileHandle,
    pub shortcuts: Vec<ShortcutInfo>,

    key: OnceLock<AppKey>,
    shortcut_icons: Mutex<HashMap<String, IconHandle>>,
}

impl AppInfo {
    /// Build a descriptor; a blank label falls back to the package name.
    pub fn new(activity: ActivityInfo, user: ProfileHandle) -> Self {
        let label = if activity.label.trim().is_empty() {
            activity.package_name.clone()
        } else {
            activity.label
        };

        Self {
            icon: None,
            badged_label: label.clone(),
            label,
            package_name: activity.package_name,
            name: activity.name,
            user,
            shortcuts: Vec::new(),
            key: OnceLock::new(),
            shortcut_icons: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_icon(mut self, icon: Option<IconHandle>) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_badged_label(mut self, badged_label: impl Into<String>) -> Self {
        self.badged_label = badged_label.into();
        self
    }

    pub fn with_shortcuts(mut self, shortcuts: Vec<ShortcutInfo>) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    /// Stable content-derived key, computed on first access
    pub fn key(&self) -> &AppKey {
        self.key
            .get_or_init(|| AppKey::for_component(&self.package_name, &self.name))
    }

    /// Icon for one of this app's shortcuts.
    ///
    /// Successful loads are cached by shortcut id; failures yield `None` and
    /// are retried on the next call.
    pub fn shortcut_icon<F>(&self, shortcut: &ShortcutInfo, load: F) -> Option<IconHandle>
    where
        F: FnOnce(&ShortcutInfo) -> Result<IconHandle>,
    {
        if let Some(icon) = self.cached_shortcut_icon(&shortcut.id) {
            return Some(icon);
        }

        match load(shortcut) {
            Ok(icon) => {
                if let Ok(mut cache) = self.shortcut_icons.lock() {
                    cache.insert(shortcut.id.clone(), icon.clone());
                }
                Some(icon)
            }
            Err(e) => {
                tracing::debug!("No icon for shortcut {}: {}", shortcut.id, e);
                None
            }
        }
    }

    fn cached_shortcut_icon(&self, id: &str) -> Option<IconHandle> {
        self.shortcut_icons
            .lock()
            .ok()
            .and_then(|cache| cache.get(id).cloned())
    }
}

impl fmt::Display for AppInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Case-insensitive label ordering used for the app list
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
