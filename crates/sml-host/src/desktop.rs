//! Launcher host backed by XDG desktop entries
//!
//! Each `*.desktop` file in an application directory is one launchable
//! activity: the desktop-file id (file name without `.desktop`) is the package
//! name and the file name is the component name. `[Desktop Action ...]` groups
//! become shortcuts. Entries that are hidden, marked `NoDisplay` or are not of
//! type `Application` are skipped.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use notify::{EventKind, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use regex::Regex;
use sml_core::prelude::*;
use sml_core::{ActivityInfo, IconHandle, ProfileHandle, ShortcutInfo};
use tokio::sync::oneshot;

use crate::capabilities::PlatformCapabilities;
use crate::host::{ChangeSender, HostChange, LauncherHost, Subscription};

/// Default debounce for application directory changes
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

const DESKTOP_EXTENSION: &str = "desktop";

/// Launcher icon size in density-independent pixels
const ICON_SIZE_DP: u32 = 48;

/// Sizes commonly shipped by icon themes
const ICON_THEME_SIZES: &[u32] = &[16, 24, 32, 48, 64, 96, 128, 256, 512];

static GROUP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.+)\]$").expect("Group header regex pattern is valid"));

static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9-]+)(\[[^\]]+\])?\s*=\s*(.*)$")
        .expect("Key-value regex pattern is valid")
});

/// One `[Desktop Action <id>]` group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopAction {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
}

/// The parts of a desktop entry the launcher uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    /// Desktop-file id, e.g. `org.gnome.Calculator`
    pub id: String,
    pub file_name: String,
    pub name: String,
    pub entry_type: String,
    pub icon: Option<String>,
    pub no_display: bool,
    pub hidden: bool,
    pub actions: Vec<DesktopAction>,
}

impl DesktopEntry {
    pub fn is_launchable(&self) -> bool {
        self.entry_type == "Application" && !self.no_display && !self.hidden
    }

    pub fn activity(&self) -> ActivityInfo {
        ActivityInfo::new(&self.id, &self.file_name, &self.name)
    }

    pub fn shortcuts(&self) -> Vec<ShortcutInfo> {
        self.actions
            .iter()
            .map(|action| ShortcutInfo::new(&action.id, &self.id, &action.name))
            .collect()
    }
}

#[derive(Debug)]
enum Group {
    Entry,
    Action(String),
    Other,
}

/// Parse a desktop entry; `None` if there is no `[Desktop Entry]` group.
///
/// Localized keys are ignored.
pub fn parse_desktop_entry(file_name: &str, contents: &str) -> Option<DesktopEntry> {
    let id = file_name
        .strip_suffix(".desktop")
        .unwrap_or(file_name)
        .to_string();

    let mut entry = DesktopEntry {
        id,
        file_name: file_name.to_string(),
        name: String::new(),
        entry_type: String::new(),
        icon: None,
        no_display: false,
        hidden: false,
        actions: Vec::new(),
    };
    let mut seen_entry = false;
    let mut listed_actions: Vec<String> = Vec::new();
    let mut action_groups: Vec<DesktopAction> = Vec::new();
    let mut group = Group::Other;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(caps) = GROUP_PATTERN.captures(line) {
            let name = &caps[1];
            group = if name == "Desktop Entry" {
                seen_entry = true;
                Group::Entry
            } else if let Some(action) = name.strip_prefix("Desktop Action ") {
                action_groups.push(DesktopAction {
                    id: action.trim().to_string(),
                    name: String::new(),
                    icon: None,
                });
                Group::Action(action.trim().to_string())
            } else {
                Group::Other
            };
            continue;
        }

        let Some(caps) = KEY_PATTERN.captures(line) else {
            continue;
        };
        if caps.get(2).is_some() {
            continue;
        }
        let key = &caps[1];
        let value = caps[3].trim().to_string();

        match &group {
            Group::Entry => match key {
                "Name" => entry.name = value,
                "Type" => entry.entry_type = value,
                "Icon" if !value.is_empty() => entry.icon = Some(value),
                "NoDisplay" => entry.no_display = value == "true",
                "Hidden" => entry.hidden = value == "true",
                "Actions" => {
                    listed_actions = value
                        .split(';')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect();
                }
                _ => {}
            },
            Group::Action(id) => {
                if let Some(action) = action_groups.iter_mut().rev().find(|a| &a.id == id) {
                    match key {
                        "Name" => action.name = value,
                        "Icon" if !value.is_empty() => action.icon = Some(value),
                        _ => {}
                    }
                }
            }
            Group::Other => {}
        }
    }

    if !seen_entry {
        return None;
    }

    // only actions listed in `Actions=` count, in that order
    entry.actions = listed_actions
        .iter()
        .filter_map(|id| action_groups.iter().find(|a| &a.id == id && !a.name.is_empty()))
        .cloned()
        .collect();

    Some(entry)
}

/// XDG application directories in precedence order
pub fn default_application_dirs() -> Vec<PathBuf> {
    let mut dirs_out = Vec::new();
    if let Some(data) = dirs::data_dir() {
        dirs_out.push(data.join("applications"));
    }
    let data_dirs = std::env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
    for dir in data_dirs.split(':').filter(|d| !d.is_empty()) {
        dirs_out.push(PathBuf::from(dir).join("applications"));
    }
    dirs_out
}

/// Icon theme size for a screen density (dpi, 160 = baseline)
pub fn icon_size_for_density(density: u32) -> u32 {
    let wanted = ICON_SIZE_DP * density.max(1) / 160;
    ICON_THEME_SIZES
        .iter()
        .copied()
        .find(|size| *size >= wanted)
        .unwrap_or(512)
}

/// Configuration for [`DesktopHost`]
#[derive(Debug, Clone)]
pub struct DesktopHostConfig {
    /// Directories searched for desktop entries, earlier ones win
    pub application_dirs: Vec<PathBuf>,
    /// Desktop-file id of the launcher itself
    pub host_package: String,
    pub debounce: Duration,
}

impl Default for DesktopHostConfig {
    fn default() -> Self {
        Self {
            application_dirs: default_application_dirs(),
            host_package: "smlauncher".to_string(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

/// [`LauncherHost`] over XDG desktop entries
#[derive(Debug, Clone)]
pub struct DesktopHost {
    config: DesktopHostConfig,
    capabilities: PlatformCapabilities,
}

impl DesktopHost {
    pub fn new(config: DesktopHostConfig, capabilities: PlatformCapabilities) -> Self {
        Self {
            config,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> &PlatformCapabilities {
        &self.capabilities
    }

    pub fn application_dirs(&self) -> &[PathBuf] {
        &self.config.application_dirs
    }

    /// All launchable entries, deduplicated by id
    pub fn scan(&self) -> Result<Vec<DesktopEntry>> {
        scan_dirs(&self.config.application_dirs)
    }

    /// The entry for a desktop-file id, honoring directory precedence
    pub fn find_entry(&self, id: &str) -> Option<DesktopEntry> {
        find_in_dirs(&self.config.application_dirs, id)
    }

    async fn find_entry_async(&self, id: &str) -> Result<Option<DesktopEntry>> {
        let dirs = self.config.application_dirs.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || find_in_dirs(&dirs, &id))
            .await
            .map_err(|e| Error::host(format!("Desktop entry lookup failed: {}", e)))
    }
}

fn scan_dirs(dirs: &[PathBuf]) -> Result<Vec<DesktopEntry>> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for dir in dirs {
        let read = match fs::read_dir(dir) {
            Ok(read) => read,
            Err(e) => {
                trace!("Skipping application dir {:?}: {}", dir, e);
                continue;
            }
        };

        let mut files: Vec<PathBuf> = read
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_desktop_file(path))
            .collect();
        files.sort();

        for path in files {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            // an entry in an earlier directory shadows later ones, even if hidden
            if !seen.insert(file_name.to_string()) {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(contents) => {
                    if let Some(entry) = parse_desktop_entry(file_name, &contents) {
                        if entry.is_launchable() {
                            entries.push(entry);
                        }
                    }
                }
                Err(e) => warn!("Failed to read {:?}: {}", path, e),
            }
        }
    }

    debug!("Found {} launchable desktop entries", entries.len());
    Ok(entries)
}

fn find_in_dirs(dirs: &[PathBuf], id: &str) -> Option<DesktopEntry> {
    let file_name = format!("{}.{}", id, DESKTOP_EXTENSION);
    dirs.iter()
        .map(|dir| dir.join(&file_name))
        .find(|path| path.is_file())
        .and_then(|path| fs::read_to_string(path).ok())
        .and_then(|contents| parse_desktop_entry(&file_name, &contents))
        .filter(DesktopEntry::is_launchable)
}

fn is_desktop_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(DESKTOP_EXTENSION)
}

fn icon_handle(icon: &str, density: u32) -> IconHandle {
    if Path::new(icon).is_absolute() {
        IconHandle::new(icon)
    } else {
        IconHandle::new(format!("{}@{}", icon, icon_size_for_density(density)))
    }
}

/// Host change for one filesystem event on a desktop file
pub fn change_for(kind: &EventKind, path: &Path) -> Option<HostChange> {
    if !is_desktop_file(path) {
        return None;
    }
    let package_name = path.file_stem()?.to_str()?.to_string();
    let user = ProfileHandle::primary();
    match kind {
        EventKind::Create(_) => Some(HostChange::PackageAdded { package_name, user }),
        EventKind::Remove(_) => Some(HostChange::PackageRemoved { package_name, user }),
        EventKind::Modify(_) => Some(HostChange::PackageChanged { package_name, user }),
        _ => None,
    }
}

fn run_watcher(
    dirs: Vec<PathBuf>,
    debounce: Duration,
    tx: ChangeSender,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let event_tx = tx.clone();
    let debouncer_result = new_debouncer(debounce, None, move |result: DebounceEventResult| {
        match result {
            Ok(events) => {
                let mut changes: Vec<HostChange> = Vec::new();
                for event in &events {
                    for path in &event.paths {
                        if let Some(change) = change_for(&event.kind, path) {
                            if !changes.contains(&change) {
                                changes.push(change);
                            }
                        }
                    }
                }
                if !changes.is_empty() {
                    debug!("Application directories changed: {} change(s)", changes.len());
                }
                for change in changes {
                    let _ = event_tx.send(change);
                }
            }
            Err(errors) => {
                for error in errors {
                    warn!("Application watcher error: {:?}", error);
                }
            }
        }
    });

    let mut debouncer = match debouncer_result {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to create application watcher: {}", e);
            return;
        }
    };

    for dir in &dirs {
        if let Err(e) = debouncer.watch(dir, RecursiveMode::NonRecursive) {
            warn!("Failed to watch {}: {}", dir.display(), e);
        } else {
            info!("Watching applications in {}", dir.display());
        }
    }

    loop {
        match stop_rx.try_recv() {
            Ok(()) | Err(oneshot::error::TryRecvError::Closed) => {
                info!("Application watcher stopping");
                break;
            }
            Err(oneshot::error::TryRecvError::Empty) => {
                if tx.is_closed() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }
}

impl LauncherHost for DesktopHost {
    async fn list_user_profiles(&self) -> Result<Vec<ProfileHandle>> {
        if !self.capabilities.per_profile_enumeration {
            return Err(Error::unsupported("per-profile enumeration"));
        }
        Ok(vec![ProfileHandle::primary()])
    }

    async fn list_activities(&self, profile: ProfileHandle) -> Result<Vec<ActivityInfo>> {
        if profile != ProfileHandle::primary() {
            return Ok(Vec::new());
        }
        let dirs = self.config.application_dirs.clone();
        let entries = tokio::task::spawn_blocking(move || scan_dirs(&dirs))
            .await
            .map_err(|e| Error::host(format!("Application scan failed: {}", e)))??;
        Ok(entries.iter().map(DesktopEntry::activity).collect())
    }

    async fn query_shortcuts(
        &self,
        package_name: &str,
        _profile: ProfileHandle,
    ) -> Result<Vec<ShortcutInfo>> {
        if !self.capabilities.shortcuts {
            return Err(Error::unsupported("shortcuts"));
        }
        Ok(self
            .find_entry_async(package_name)
            .await?
            .map(|entry| entry.shortcuts())
            .unwrap_or_default())
    }

    async fn load_icon(
        &self,
        activity: &ActivityInfo,
        _profile: ProfileHandle,
        density: u32,
    ) -> Result<IconHandle> {
        self.find_entry_async(&activity.package_name)
            .await?
            .and_then(|entry| entry.icon)
            .map(|icon| icon_handle(&icon, density))
            .ok_or_else(|| Error::icon_unavailable(&activity.name))
    }

    fn load_shortcut_icon(&self, shortcut: &ShortcutInfo, density: u32) -> Result<IconHandle> {
        self.find_entry(&shortcut.package_name)
            .and_then(|entry| {
                entry
                    .actions
                    .into_iter()
                    .find(|action| action.id == shortcut.id)
                    .and_then(|action| action.icon)
            })
            .map(|icon| icon_handle(&icon, density))
            .ok_or_else(|| Error::icon_unavailable(format!("{}/{}", shortcut.package_name, shortcut.id)))
    }

    fn badged_label(&self, label: &str, profile: ProfileHandle) -> String {
        if profile.managed {
            format!("{} (Work)", label)
        } else {
            label.to_string()
        }
    }

    fn host_package_name(&self) -> &str {
        &self.config.host_package
    }

    fn observe_package_changes(&self, tx: ChangeSender) -> Result<Subscription> {
        let dirs: Vec<PathBuf> = self
            .config
            .application_dirs
            .iter()
            .filter(|dir| dir.is_dir())
            .cloned()
            .collect();
        if dirs.is_empty() {
            warn!("No application directories to watch");
            return Ok(Subscription::noop());
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let debounce = self.config.debounce;
        tokio::task::spawn_blocking(move || run_watcher(dirs, debounce, tx, stop_rx));

        Ok(Subscription::new(move || {
            let _ = stop_tx.send(());
        }))
    }

    fn observe_profile_availability(&self, _tx: ChangeSender) -> Result<Subscription> {
        // a desktop session has no secondary profiles
        Ok(Subscription::noop())
    }
}
