//! Live application registry
//!
//! [`LiveApps`] enumerates launchable activities across user profiles and
//! publishes them as one sorted [`AppSnapshot`]. It runs only while observed:
//! the first [`AppsObserver`] registers the host listeners and starts an
//! enumeration, and dropping the last one cancels in-flight work and
//! unregisters everything.
//!
//! Every reload starts a new cycle and aborts the previous one. Cycles carry a
//! generation number and publish only while they are still the newest, so a
//! superseded cycle can never overwrite a later result.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use sml_core::prelude::*;
use sml_core::{compare_labels, AppInfo, IconHandle, ProfileHandle, ShortcutInfo};
use sml_host::{HostChange, LauncherHost, Subscription};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::DEFAULT_ICON_DENSITY;

/// One published, sorted application list
#[derive(Debug)]
pub struct AppSnapshot {
    /// Cycle that produced this list
    pub generation: u64,
    pub apps: Vec<Arc<AppInfo>>,
}

impl AppSnapshot {
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.apps.iter().map(|app| app.label.as_str()).collect()
    }
}

/// A cycle that ran to completion but could not list applications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleFailure {
    pub generation: u64,
    pub message: String,
}

impl CycleFailure {
    fn to_error(&self) -> Error {
        Error::enumeration(self.generation, self.message.clone())
    }
}

#[derive(Debug, Clone)]
pub struct LiveAppsConfig {
    /// Density passed to icon loading
    pub icon_density: u32,
}

impl Default for LiveAppsConfig {
    fn default() -> Self {
        Self {
            icon_density: DEFAULT_ICON_DENSITY,
        }
    }
}

#[derive(Default)]
struct RegistryState {
    observers: usize,
    cycle: Option<JoinHandle<()>>,
    listener: Option<JoinHandle<()>>,
    subscriptions: Vec<Subscription>,
}

struct Inner<H> {
    host: Arc<H>,
    config: LiveAppsConfig,
    state: Mutex<RegistryState>,
    generation: AtomicU64,
    snapshot_tx: watch::Sender<Option<Arc<AppSnapshot>>>,
    /// Failure of the newest finished cycle; cleared by the next publish
    failure_tx: watch::Sender<Option<CycleFailure>>,
}

/// Observable registry of launchable applications
pub struct LiveApps<H> {
    inner: Arc<Inner<H>>,
}

impl<H> Clone for LiveApps<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> LiveApps<H>
where
    H: LauncherHost + Sync + 'static,
{
    pub fn new(host: Arc<H>, config: LiveAppsConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (failure_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                host,
                config,
                state: Mutex::new(RegistryState::default()),
                generation: AtomicU64::new(0),
                snapshot_tx,
                failure_tx,
            }),
        }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.inner.host
    }

    /// Latest published snapshot, if any cycle has completed
    pub fn snapshot(&self) -> Option<Arc<AppSnapshot>> {
        self.inner.snapshot_tx.borrow().clone()
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock_state().observers
    }

    /// Whether listeners are registered
    pub fn is_active(&self) -> bool {
        self.observer_count() > 0
    }

    /// Attach an observer, starting the registry if it was idle.
    ///
    /// Must be called inside a tokio runtime.
    pub fn observe(&self) -> AppsObserver<H> {
        // subscribe first so the first cycle's result is seen as a change
        let rx = self.inner.snapshot_tx.subscribe();
        let failure_rx = self.inner.failure_tx.subscribe();
        let mut state = self.inner.lock_state();
        state.observers += 1;
        if state.observers == 1 {
            info!("Application registry starting");
            self.start(&mut state);
            self.inner.restart_cycle(&mut state);
        }
        drop(state);

        AppsObserver {
            registry: self.clone(),
            rx,
            failure_rx,
        }
    }

    /// Start a new enumeration cycle, superseding any in flight.
    ///
    /// Does nothing while unobserved.
    pub fn reload(&self) {
        let mut state = self.inner.lock_state();
        if state.observers == 0 {
            trace!("Reload ignored, registry has no observers");
            return;
        }
        self.inner.restart_cycle(&mut state);
    }

    /// Icon for one of `app`'s shortcuts, loaded on first use and cached on the app
    pub fn shortcut_icon(&self, app: &AppInfo, shortcut: &ShortcutInfo) -> Option<IconHandle> {
        let density = self.inner.config.icon_density;
        app.shortcut_icon(shortcut, |s| self.inner.host.load_shortcut_icon(s, density))
    }

    fn start(&self, state: &mut RegistryState) {
        let (tx, rx) = mpsc::unbounded_channel();

        match self.inner.host.observe_package_changes(tx.clone()) {
            Ok(subscription) => state.subscriptions.push(subscription),
            Err(e) => warn!("Package change notifications unavailable: {}", e),
        }
        match self.inner.host.observe_profile_availability(tx) {
            Ok(subscription) => state.subscriptions.push(subscription),
            Err(e) => warn!("Profile notifications unavailable: {}", e),
        }

        let weak = Arc::downgrade(&self.inner);
        state.listener = Some(tokio::spawn(listen(weak, rx)));
    }

    fn detach(&self) {
        let mut state = self.inner.lock_state();
        state.observers = state.observers.saturating_sub(1);
        if state.observers > 0 {
            return;
        }

        // no cycle that is still running may publish after this
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.failure_tx.send_replace(None);
        if let Some(cycle) = state.cycle.take() {
            cycle.abort();
        }
        if let Some(listener) = state.listener.take() {
            listener.abort();
        }
        let subscriptions = std::mem::take(&mut state.subscriptions);
        drop(state);

        for subscription in subscriptions {
            subscription.cancel();
        }
        info!("Application registry stopped");
    }
}

async fn listen<H>(registry: Weak<Inner<H>>, mut rx: mpsc::UnboundedReceiver<HostChange>)
where
    H: LauncherHost + Sync + 'static,
{
    while let Some(change) = rx.recv().await {
        let Some(inner) = registry.upgrade() else {
            break;
        };
        debug!("Host change {:?}, reloading applications", change);
        let mut state = inner.lock_state();
        if state.observers > 0 {
            inner.restart_cycle(&mut state);
        }
    }
    trace!("Host change listener finished");
}

impl<H> Inner<H>
where
    H: LauncherHost + Sync + 'static,
{
    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn restart_cycle(self: &Arc<Self>, state: &mut RegistryState) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = state.cycle.take() {
            previous.abort();
        }
        debug!("Enumeration cycle {} started", generation);

        let inner = Arc::clone(self);
        state.cycle = Some(tokio::spawn(async move {
            match inner.enumerate(generation).await {
                Ok(apps) => {
                    inner.publish(generation, apps);
                }
                Err(Error::Superseded { generation }) => {
                    debug!("Enumeration cycle {} superseded", generation);
                }
                Err(e) => {
                    // the previous snapshot stays published
                    warn!("Enumeration cycle {} failed: {}", generation, e);
                    inner.publish_failure(generation, &e);
                }
            }
        }));
    }

    fn ensure_current(&self, generation: u64) -> Result<()> {
        if self.generation.load(Ordering::SeqCst) == generation {
            Ok(())
        } else {
            Err(Error::Superseded { generation })
        }
    }

    async fn enumerate(&self, generation: u64) -> Result<Vec<Arc<AppInfo>>> {
        let host = &self.host;

        let profiles = match host.list_user_profiles().await {
            Ok(profiles) => profiles,
            Err(Error::Unsupported { .. }) => {
                debug!("Per-profile enumeration unsupported, listing primary profile");
                vec![ProfileHandle::primary()]
            }
            Err(e) => return Err(e),
        };

        let own_package = host.host_package_name().to_string();
        let mut seen = HashSet::new();
        let mut apps = Vec::new();

        for profile in profiles {
            self.ensure_current(generation)?;
            let activities = host.list_activities(profile).await?;

            for activity in activities {
                if activity.package_name == own_package {
                    continue;
                }
                self.ensure_current(generation)?;

                let shortcuts = match host.query_shortcuts(&activity.package_name, profile).await
                {
                    Ok(shortcuts) => shortcuts,
                    Err(e) => {
                        debug!("No shortcuts for {}: {}", activity.package_name, e);
                        Vec::new()
                    }
                };

                let icon = match host
                    .load_icon(&activity, profile, self.config.icon_density)
                    .await
                {
                    Ok(icon) => Some(icon),
                    Err(e) => {
                        debug!("No icon for {}: {}", activity.name, e);
                        None
                    }
                };

                let app = AppInfo::new(activity, profile)
                    .with_icon(icon)
                    .with_shortcuts(shortcuts);
                let badged = host.badged_label(&app.label, profile);
                let app = app.with_badged_label(badged);

                // same component listed twice for one profile
                if !seen.insert((app.key().clone(), profile)) {
                    continue;
                }
                apps.push(Arc::new(app));
            }
        }

        self.ensure_current(generation)?;
        apps.sort_by(|a, b| compare_labels(&a.label, &b.label));
        Ok(apps)
    }

    fn publish(&self, generation: u64, apps: Vec<Arc<AppInfo>>) -> bool {
        // checked under the state lock so a concurrent restart cannot interleave
        let _state = self.lock_state();
        if self.ensure_current(generation).is_err() {
            debug!("Discarding result of superseded cycle {}", generation);
            return false;
        }

        debug!(
            "Publishing {} application(s) from cycle {}",
            apps.len(),
            generation
        );
        self.snapshot_tx
            .send_replace(Some(Arc::new(AppSnapshot { generation, apps })));
        self.failure_tx.send_if_modified(|failure| failure.take().is_some());
        true
    }

    fn publish_failure(&self, generation: u64, error: &Error) -> bool {
        let _state = self.lock_state();
        if self.ensure_current(generation).is_err() {
            return false;
        }
        self.failure_tx.send_replace(Some(CycleFailure {
            generation,
            message: error.to_string(),
        }));
        true
    }
}

/// Observer guard; the registry runs while at least one exists
pub struct AppsObserver<H>
where
    H: LauncherHost + Sync + 'static,
{
    registry: LiveApps<H>,
    rx: watch::Receiver<Option<Arc<AppSnapshot>>>,
    failure_rx: watch::Receiver<Option<CycleFailure>>,
}

impl<H> AppsObserver<H>
where
    H: LauncherHost + Sync + 'static,
{
    /// Latest snapshot without waiting
    pub fn latest(&self) -> Option<Arc<AppSnapshot>> {
        self.rx.borrow().clone()
    }

    /// The latest snapshot, waiting for the first one if none exists yet.
    ///
    /// Without a snapshot, a failed newest cycle is returned as
    /// [`Error::Enumeration`].
    pub async fn current(&mut self) -> Result<Arc<AppSnapshot>> {
        if let Some(snapshot) = self.latest() {
            return Ok(snapshot);
        }
        let failure = self.failure_rx.borrow_and_update().clone();
        if let Some(failure) = failure {
            return Err(failure.to_error());
        }
        self.changed().await
    }

    /// Wait for the next cycle to finish.
    ///
    /// Returns its snapshot, or [`Error::Enumeration`] if it failed.
    pub async fn changed(&mut self) -> Result<Arc<AppSnapshot>> {
        loop {
            tokio::select! {
                result = self.rx.changed() => {
                    result.map_err(|_| Error::ChannelClosed)?;
                    let latest = self.rx.borrow_and_update().clone();
                    if let Some(snapshot) = latest {
                        return Ok(snapshot);
                    }
                }
                result = self.failure_rx.changed() => {
                    result.map_err(|_| Error::ChannelClosed)?;
                    let failure = self.failure_rx.borrow_and_update().clone();
                    if let Some(failure) = failure {
                        return Err(failure.to_error());
                    }
                }
            }
        }
    }

    pub fn registry(&self) -> &LiveApps<H> {
        &self.registry
    }
}

impl<H> Drop for AppsObserver<H>
where
    H: LauncherHost + Sync + 'static,
{
    fn drop(&mut self) {
        self.registry.detach();
    }
}
