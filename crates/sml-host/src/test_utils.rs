//! Test utilities for host-dependent code
//!
//! [`FakeHost`] is an in-memory [`LauncherHost`] whose contents, failures and
//! timing are controlled by the test.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use sml_core::prelude::*;
use sml_core::{ActivityInfo, IconHandle, ProfileHandle, ShortcutInfo};
use tokio::sync::{Notify, Semaphore};

use crate::host::{ChangeSender, HostChange, LauncherHost, Subscription};

/// Package name the fake host reports for the launcher itself
pub const FAKE_HOST_PACKAGE: &str = "org.example.launcher";

/// Creates an activity whose component name is `<package>.Main`.
pub fn test_activity(package_name: &str, label: &str) -> ActivityInfo {
    ActivityInfo::new(package_name, format!("{}.Main", package_name), label)
}

#[derive(Default)]
struct FakeState {
    /// `None` means per-profile enumeration is unsupported
    profiles: Option<Vec<ProfileHandle>>,
    activities: HashMap<ProfileHandle, Vec<ActivityInfo>>,
    shortcuts: HashMap<String, Vec<ShortcutInfo>>,
    missing_icons: HashSet<String>,
    package_senders: Vec<ChangeSender>,
    profile_senders: Vec<ChangeSender>,
}

/// In-memory [`LauncherHost`]
pub struct FakeHost {
    state: Mutex<FakeState>,
    shortcuts_denied: AtomicBool,
    fail_enumeration: AtomicBool,
    gated: AtomicBool,
    gate: Semaphore,
    enumeration_started: Notify,
    activity_calls: AtomicUsize,
    icon_loads: AtomicUsize,
    shortcut_icon_loads: AtomicUsize,
    active_subscriptions: Arc<AtomicUsize>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    /// A host with only the primary profile and no activities
    pub fn new() -> Self {
        let state = FakeState {
            profiles: Some(vec![ProfileHandle::primary()]),
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
            shortcuts_denied: AtomicBool::new(false),
            fail_enumeration: AtomicBool::new(false),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
            enumeration_started: Notify::new(),
            activity_calls: AtomicUsize::new(0),
            icon_loads: AtomicUsize::new(0),
            shortcut_icon_loads: AtomicUsize::new(0),
            active_subscriptions: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_profiles(&self, profiles: Vec<ProfileHandle>) {
        self.state().profiles = Some(profiles);
    }

    /// Make `list_user_profiles` report `Unsupported`
    pub fn set_profiles_unsupported(&self) {
        self.state().profiles = None;
    }

    pub fn set_activities(&self, profile: ProfileHandle, activities: Vec<ActivityInfo>) {
        self.state().activities.insert(profile, activities);
    }

    pub fn add_activity(&self, profile: ProfileHandle, activity: ActivityInfo) {
        self.state()
            .activities
            .entry(profile)
            .or_default()
            .push(activity);
    }

    pub fn remove_package(&self, profile: ProfileHandle, package_name: &str) {
        if let Some(list) = self.state().activities.get_mut(&profile) {
            list.retain(|a| a.package_name != package_name);
        }
    }

    pub fn set_shortcuts(&self, package_name: &str, shortcuts: Vec<ShortcutInfo>) {
        self.state()
            .shortcuts
            .insert(package_name.to_string(), shortcuts);
    }

    pub fn set_shortcuts_denied(&self, denied: bool) {
        self.shortcuts_denied.store(denied, Ordering::SeqCst);
    }

    /// Icon loads for this component name fail
    pub fn set_icon_missing(&self, component_name: &str) {
        self.state()
            .missing_icons
            .insert(component_name.to_string());
    }

    pub fn set_fail_enumeration(&self, fail: bool) {
        self.fail_enumeration.store(fail, Ordering::SeqCst);
    }

    /// Hold every `list_activities` call until [`FakeHost::release`].
    ///
    /// Ungating affects later calls only; held calls still need a release.
    pub fn set_gated(&self, gated: bool) {
        self.gated.store(gated, Ordering::SeqCst);
    }

    /// Let `n` held `list_activities` calls finish
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Wait until `list_activities` has been entered at least `n` times
    pub async fn wait_for_enumerations(&self, n: usize) {
        loop {
            let notified = self.enumeration_started.notified();
            if self.activity_calls() >= n {
                return;
            }
            notified.await;
        }
    }

    /// Deliver a change to the matching observers
    pub fn emit_change(&self, change: HostChange) {
        let mut state = self.state();
        let senders = if change.is_profile_change() {
            &mut state.profile_senders
        } else {
            &mut state.package_senders
        };
        senders.retain(|tx| tx.send(change.clone()).is_ok());
    }

    pub fn activity_calls(&self) -> usize {
        self.activity_calls.load(Ordering::SeqCst)
    }

    pub fn icon_loads(&self) -> usize {
        self.icon_loads.load(Ordering::SeqCst)
    }

    pub fn shortcut_icon_loads(&self) -> usize {
        self.shortcut_icon_loads.load(Ordering::SeqCst)
    }

    /// Registered listeners that have not been cancelled
    pub fn active_subscriptions(&self) -> usize {
        self.active_subscriptions.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> Subscription {
        self.active_subscriptions.fetch_add(1, Ordering::SeqCst);
        let counter = Arc::clone(&self.active_subscriptions);
        Subscription::new(move || {
            counter.fetch_sub(1, Ordering::SeqCst);
        })
    }
}

impl LauncherHost for FakeHost {
    async fn list_user_profiles(&self) -> Result<Vec<ProfileHandle>> {
        self.state()
            .profiles
            .clone()
            .ok_or_else(|| Error::unsupported("per-profile enumeration"))
    }

    async fn list_activities(&self, profile: ProfileHandle) -> Result<Vec<ActivityInfo>> {
        // snapshot first so changes made while gated land in the next cycle
        let snapshot = self
            .state()
            .activities
            .get(&profile)
            .cloned()
            .unwrap_or_default();
        let failing = self.fail_enumeration.load(Ordering::SeqCst);

        self.activity_calls.fetch_add(1, Ordering::SeqCst);
        self.enumeration_started.notify_waiters();

        if self.gated.load(Ordering::SeqCst) {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| Error::ChannelClosed)?;
            permit.forget();
        }

        if failing {
            return Err(Error::host("activity enumeration failed"));
        }
        Ok(snapshot)
    }

    async fn query_shortcuts(
        &self,
        package_name: &str,
        _profile: ProfileHandle,
    ) -> Result<Vec<ShortcutInfo>> {
        if self.shortcuts_denied.load(Ordering::SeqCst) {
            return Err(Error::permission_denied("shortcut access"));
        }
        Ok(self
            .state()
            .shortcuts
            .get(package_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn load_icon(
        &self,
        activity: &ActivityInfo,
        _profile: ProfileHandle,
        _density: u32,
    ) -> Result<IconHandle> {
        self.icon_loads.fetch_add(1, Ordering::SeqCst);
        if self.state().missing_icons.contains(&activity.name) {
            return Err(Error::icon_unavailable(&activity.name));
        }
        Ok(IconHandle::new(format!("icon:{}", activity.name)))
    }

    fn load_shortcut_icon(&self, shortcut: &ShortcutInfo, _density: u32) -> Result<IconHandle> {
        self.shortcut_icon_loads.fetch_add(1, Ordering::SeqCst);
        Ok(IconHandle::new(format!("shortcut:{}", shortcut.id)))
    }

    fn badged_label(&self, label: &str, profile: ProfileHandle) -> String {
        if profile.managed {
            format!("{} (Work)", label)
        } else {
            label.to_string()
        }
    }

    fn host_package_name(&self) -> &str {
        FAKE_HOST_PACKAGE
    }

    fn observe_package_changes(&self, tx: ChangeSender) -> Result<Subscription> {
        self.state().package_senders.push(tx);
        Ok(self.subscribe())
    }

    fn observe_profile_availability(&self, tx: ChangeSender) -> Result<Subscription> {
        self.state().profile_senders.push(tx);
        Ok(self.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_gated_enumeration_uses_snapshot() {
        let host = Arc::new(FakeHost::new());
        host.set_activities(
            ProfileHandle::primary(),
            vec![test_activity("org.example.a", "A")],
        );
        host.set_gated(true);

        let task_host = Arc::clone(&host);
        let task = tokio::spawn(async move {
            task_host.list_activities(ProfileHandle::primary()).await
        });

        host.wait_for_enumerations(1).await;
        host.add_activity(ProfileHandle::primary(), test_activity("org.example.b", "B"));
        host.release(1);

        let listed = task.await.unwrap().unwrap();
        assert_eq!(listed.len(), 1);

        host.set_gated(false);
        let listed = host.list_activities(ProfileHandle::primary()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(host.activity_calls(), 2);
    }

    #[tokio::test]
    async fn test_emit_reaches_package_observers() {
        let host = FakeHost::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = host.observe_package_changes(tx).unwrap();
        assert_eq!(host.active_subscriptions(), 1);

        host.emit_change(HostChange::PackageAdded {
            package_name: "org.example".to_string(),
            user: ProfileHandle::primary(),
        });
        let change = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(change, HostChange::PackageAdded { .. }));

        drop(subscription);
        assert_eq!(host.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let host = FakeHost::new();
        host.set_profiles_unsupported();
        assert!(matches!(
            host.list_user_profiles().await,
            Err(Error::Unsupported { .. })
        ));

        host.set_shortcuts_denied(true);
        assert!(matches!(
            host.query_shortcuts("x", ProfileHandle::primary()).await,
            Err(Error::PermissionDenied { .. })
        ));

        host.set_fail_enumeration(true);
        assert!(host.list_activities(ProfileHandle::primary()).await.is_err());
    }
}
