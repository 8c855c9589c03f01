//! Drawer feed: registry snapshots filtered by the hidden-app preference

use std::collections::BTreeSet;
use std::sync::Arc;

use sml_core::prelude::*;
use sml_core::AppInfo;
use sml_host::LauncherHost;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::filter::AppListFilter;
use crate::registry::AppsObserver;

/// One visible list delivered to the drawer
#[derive(Debug, Clone, Default)]
pub struct DrawerList {
    /// Registry cycle the list was built from; 0 before the first snapshot
    pub generation: u64,
    pub apps: Vec<Arc<AppInfo>>,
}

/// Background task keeping a filtered app list current.
///
/// Holds a registry observer for as long as it runs; dropping the feed stops
/// the task and detaches the observer.
pub struct DrawerFeed {
    rx: watch::Receiver<DrawerList>,
    task: JoinHandle<()>,
}

impl DrawerFeed {
    pub fn spawn<H>(
        observer: AppsObserver<H>,
        hidden_rx: watch::Receiver<BTreeSet<String>>,
    ) -> Self
    where
        H: LauncherHost + Sync + 'static,
    {
        let (tx, rx) = watch::channel(DrawerList::default());
        let task = tokio::spawn(run_feed(observer, hidden_rx, tx));
        Self { rx, task }
    }

    /// Receiver of visible lists
    pub fn subscribe(&self) -> watch::Receiver<DrawerList> {
        self.rx.clone()
    }

    pub fn current(&self) -> DrawerList {
        self.rx.borrow().clone()
    }
}

impl Drop for DrawerFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_feed<H>(
    mut observer: AppsObserver<H>,
    mut hidden_rx: watch::Receiver<BTreeSet<String>>,
    tx: watch::Sender<DrawerList>,
) where
    H: LauncherHost + Sync + 'static,
{
    let mut filter = AppListFilter::new();
    let initial_hidden = hidden_rx.borrow_and_update().clone();
    filter.set_hidden_keys(initial_hidden);
    if let Some(snapshot) = observer.latest() {
        filter.submit_snapshot(snapshot);
        publish(&filter, &tx);
    }

    loop {
        tokio::select! {
            result = observer.changed() => {
                match result {
                    Ok(snapshot) => {
                        filter.submit_snapshot(snapshot);
                    }
                    Err(Error::ChannelClosed) => {
                        debug!("Drawer feed lost the registry");
                        break;
                    }
                    Err(e) => {
                        // the drawer keeps showing the previous list
                        debug!("Drawer feed skipped a failed cycle: {}", e);
                        continue;
                    }
                }
            }
            result = hidden_rx.changed() => {
                if result.is_err() {
                    debug!("Drawer feed lost the hidden-app preference");
                    break;
                }
                let hidden = hidden_rx.borrow_and_update().clone();
                filter.set_hidden_keys(hidden);
            }
        }

        if filter.snapshot().is_some() {
            publish(&filter, &tx);
        }
    }
}

fn publish(filter: &AppListFilter, tx: &watch::Sender<DrawerList>) {
    let generation = filter.snapshot().map_or(0, |s| s.generation);
    let apps = filter.visible().to_vec();
    trace!("Drawer list: {} visible app(s)", apps.len());
    tx.send_replace(DrawerList { generation, apps });
}
