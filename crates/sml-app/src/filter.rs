//! Hidden-app filtering over published snapshots
//!
//! The filter never touches the snapshot. It keeps the latest snapshot and the
//! hidden key set and recomputes the visible list whenever either changes.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use sml_core::AppInfo;

use crate::registry::AppSnapshot;

/// Apps from `apps` whose key is not in `hidden`, order preserved
pub fn visible_apps(apps: &[Arc<AppInfo>], hidden: &HashSet<String>) -> Vec<Arc<AppInfo>> {
    apps.iter()
        .filter(|app| !hidden.contains(app.key().as_str()))
        .cloned()
        .collect()
}

/// Drawer view: latest snapshot minus hidden apps
#[derive(Debug, Default)]
pub struct AppListFilter {
    snapshot: Option<Arc<AppSnapshot>>,
    hidden: HashSet<String>,
    visible: Vec<Arc<AppInfo>>,
}

impl AppListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new snapshot and reapply the current hidden set
    pub fn submit_snapshot(&mut self, snapshot: Arc<AppSnapshot>) -> &[Arc<AppInfo>] {
        self.snapshot = Some(snapshot);
        self.refresh();
        &self.visible
    }

    /// Replace the hidden set and reapply it to the latest snapshot
    pub fn set_hidden_keys<I, S>(&mut self, keys: I) -> &[Arc<AppInfo>]
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden = keys.into_iter().map(Into::into).collect();
        self.refresh();
        &self.visible
    }

    pub fn visible(&self) -> &[Arc<AppInfo>] {
        &self.visible
    }

    pub fn snapshot(&self) -> Option<&Arc<AppSnapshot>> {
        self.snapshot.as_ref()
    }

    pub fn hidden_keys(&self) -> &HashSet<String> {
        &self.hidden
    }

    pub fn is_hidden(&self, app: &AppInfo) -> bool {
        self.hidden.contains(app.key().as_str())
    }

    fn refresh(&mut self) {
        self.visible = match &self.snapshot {
            Some(snapshot) => visible_apps(&snapshot.apps, &self.hidden),
            None => Vec::new(),
        };
    }
}

/// One entry of the hide-apps screen
#[derive(Debug, Clone, Serialize)]
pub struct HideListRow {
    pub key: String,
    pub label: String,
    pub package_name: String,
    pub hidden: bool,
}

/// Every app in the snapshot, flagged by key membership in `hidden`
pub fn hide_list_rows<'a, I>(snapshot: &AppSnapshot, hidden: I) -> Vec<HideListRow>
where
    I: IntoIterator<Item = &'a String>,
{
    let hidden: HashSet<&str> = hidden.into_iter().map(String::as_str).collect();
    snapshot
        .apps
        .iter()
        .map(|app| {
            let key = app.key().as_str();
            HideListRow {
                key: key.to_string(),
                label: app.label.clone(),
                package_name: app.package_name.clone(),
                hidden: hidden.contains(key),
            }
        })
        .collect()
}
