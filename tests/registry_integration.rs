//! Integration tests for the application registry, hidden-app preference and drawer feed

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::timeout;

use sml_app::config::{preferences_file, Settings};
use sml_app::{AppListFilter, DrawerList, LauncherContext, LiveApps, LiveAppsConfig, PreferenceStore};
use sml_core::{AppKey, ProfileHandle};
use sml_host::test_utils::{test_activity, FakeHost};
use sml_host::{HostChange, PlatformCapabilities, SysfsBattery};

const WAIT: Duration = Duration::from_secs(5);

fn key(package: &str) -> String {
    AppKey::for_component(package, &format!("{}.Main", package)).to_string()
}

fn labels(list: &DrawerList) -> Vec<String> {
    list.apps.iter().map(|app| app.label.clone()).collect()
}

async fn context(temp: &TempDir, host: Arc<FakeHost>) -> LauncherContext<FakeHost> {
    let preferences = PreferenceStore::open(preferences_file(temp.path()))
        .await
        .unwrap();
    LauncherContext::new(
        temp.path(),
        Settings::default(),
        PlatformCapabilities::unsupported(),
        host,
        preferences,
        SysfsBattery::new(temp.path().join("power_supply")),
    )
}

async fn next_list(rx: &mut tokio::sync::watch::Receiver<DrawerList>) -> DrawerList {
    timeout(WAIT, rx.changed()).await.unwrap().unwrap();
    rx.borrow_and_update().clone()
}

#[tokio::test]
async fn test_only_latest_cycle_reaches_the_drawer() {
    let temp = TempDir::new().unwrap();
    let host = Arc::new(FakeHost::new());
    host.set_activities(
        ProfileHandle::primary(),
        vec![test_activity("org.example.old", "Old")],
    );
    host.set_gated(true);

    let ctx = context(&temp, Arc::clone(&host)).await;
    let feed = ctx.drawer_feed();
    let mut rx = feed.subscribe();

    // cycle 1 is held with the old list; a package change starts cycle 2
    host.wait_for_enumerations(1).await;
    host.add_activity(ProfileHandle::primary(), test_activity("org.example.new", "New"));
    host.emit_change(HostChange::PackageAdded {
        package_name: "org.example.new".to_string(),
        user: ProfileHandle::primary(),
    });
    host.wait_for_enumerations(2).await;
    host.release(2);

    let list = next_list(&mut rx).await;
    assert_eq!(list.generation, 2);
    assert_eq!(labels(&list), vec!["New", "Old"]);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(feed.current().generation, 2);
}

#[tokio::test]
async fn test_hiding_updates_the_drawer_and_persists() {
    let temp = TempDir::new().unwrap();
    let host = Arc::new(FakeHost::new());
    host.set_activities(
        ProfileHandle::primary(),
        vec![
            test_activity("org.example.mail", "Mail"),
            test_activity("org.example.maps", "Maps"),
        ],
    );

    let ctx = context(&temp, Arc::clone(&host)).await;
    let feed = ctx.drawer_feed();
    let mut rx = feed.subscribe();
    assert_eq!(labels(&next_list(&mut rx).await), vec!["Mail", "Maps"]);

    ctx.preferences()
        .add_hidden_app(&key("org.example.mail"))
        .await
        .unwrap();
    assert_eq!(labels(&next_list(&mut rx).await), vec!["Maps"]);

    // the registry itself still lists every app
    let snapshot = ctx.registry().snapshot().unwrap();
    assert_eq!(snapshot.len(), 2);

    drop(feed);
    let reopened = PreferenceStore::open(preferences_file(temp.path()))
        .await
        .unwrap();
    assert_eq!(
        reopened.hidden_apps(),
        BTreeSet::from([key("org.example.mail")])
    );
}

#[tokio::test]
async fn test_removed_package_disappears_after_change() {
    let host = Arc::new(FakeHost::new());
    host.set_activities(
        ProfileHandle::primary(),
        vec![
            test_activity("org.example.mail", "Mail"),
            test_activity("org.example.maps", "Maps"),
        ],
    );
    let apps = LiveApps::new(Arc::clone(&host), LiveAppsConfig::default());
    let mut observer = apps.observe();
    let first = timeout(WAIT, observer.current()).await.unwrap().unwrap();
    assert_eq!(first.len(), 2);

    host.remove_package(ProfileHandle::primary(), "org.example.maps");
    host.emit_change(HostChange::PackageRemoved {
        package_name: "org.example.maps".to_string(),
        user: ProfileHandle::primary(),
    });

    let next = timeout(WAIT, observer.changed()).await.unwrap().unwrap();
    assert_eq!(next.labels(), vec!["Mail"]);
    // descriptors are rebuilt, keys stay stable
    assert_eq!(next.apps[0].key(), first.apps[0].key());
    assert!(!Arc::ptr_eq(&next.apps[0], &first.apps[0]));
}

#[tokio::test]
async fn test_filter_is_idempotent_across_resubmission() {
    let host = Arc::new(FakeHost::new());
    host.set_activities(
        ProfileHandle::primary(),
        vec![
            test_activity("org.example.a", "A"),
            test_activity("org.example.b", "B"),
            test_activity("org.example.c", "C"),
        ],
    );
    let apps = LiveApps::new(Arc::clone(&host), LiveAppsConfig::default());
    let mut observer = apps.observe();
    let snapshot = timeout(WAIT, observer.current()).await.unwrap().unwrap();

    let mut filter = AppListFilter::new();
    filter.set_hidden_keys([key("org.example.b")]);
    let first: Vec<String> = filter
        .submit_snapshot(Arc::clone(&snapshot))
        .iter()
        .map(|a| a.label.clone())
        .collect();
    filter.set_hidden_keys([key("org.example.b")]);
    let second: Vec<String> = filter
        .submit_snapshot(snapshot)
        .iter()
        .map(|a| a.label.clone())
        .collect();

    assert_eq!(first, vec!["A", "C"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_no_listeners_remain_after_feed_is_dropped() {
    let temp = TempDir::new().unwrap();
    let host = Arc::new(FakeHost::new());
    let ctx = context(&temp, Arc::clone(&host)).await;

    let feed = ctx.drawer_feed();
    let mut rx = feed.subscribe();
    next_list(&mut rx).await;
    assert_eq!(host.active_subscriptions(), 2);

    drop(feed);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(host.active_subscriptions(), 0);
    assert!(!ctx.registry().is_active());
}
