//! Command runners - each one drives the launcher context and emits events

use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use sml_app::{AppListFilter, AppSnapshot, LauncherContext, LauncherHost};
use sml_core::prelude::*;
use sml_core::{AppInfo, Rect};
use tokio::time::{interval, timeout};

use super::HeadlessEvent;

/// Upper bound for one enumeration when a command needs a single list
pub const ENUMERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// How often `watch` re-reads the battery
pub const BATTERY_POLL_INTERVAL: Duration = Duration::from_secs(30);

static HEX_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{32}$").expect("App key regex pattern is valid"));

/// Print apps; with `all`, every app with its hidden flag
pub async fn run_apps<H>(ctx: &LauncherContext<H>, all: bool) -> Result<()>
where
    H: LauncherHost + Sync + 'static,
{
    if all {
        let rows = timeout(ENUMERATION_TIMEOUT, ctx.hide_list())
            .await
            .map_err(|_| Error::host("Application enumeration timed out"))??;
        HeadlessEvent::hide_list(rows).emit();
        return Ok(());
    }

    let snapshot = fresh_snapshot(ctx).await?;
    let generation = snapshot.generation;
    let visible = visible_list(snapshot, ctx.preferences().hidden_apps());
    HeadlessEvent::apps(generation, visible.iter().map(|app| &**app)).emit();
    Ok(())
}

/// Hide or unhide by key, or by package name for every app of that package
pub async fn run_set_hidden<H>(ctx: &LauncherContext<H>, target: &str, hide: bool) -> Result<()>
where
    H: LauncherHost + Sync + 'static,
{
    let keys = resolve_keys(ctx, target).await?;
    if keys.is_empty() {
        return Err(Error::config(format!("No app matches '{}'", target)));
    }

    for key in keys {
        let changed = if hide {
            ctx.preferences().add_hidden_app(&key).await?
        } else {
            ctx.preferences().remove_hidden_app(&key).await?
        };
        info!("{} {} (changed: {})", if hide { "Hid" } else { "Unhid" }, key, changed);
        HeadlessEvent::hidden_changed(&key, hide, changed).emit();
    }
    Ok(())
}

/// Print the hidden-app keys
pub fn run_hidden<H>(ctx: &LauncherContext<H>)
where
    H: LauncherHost + Sync + 'static,
{
    HeadlessEvent::hidden(ctx.preferences().hidden_apps()).emit();
}

/// Read the battery and print the meter geometry for a `width`x`height` box
pub fn run_battery<H>(ctx: &LauncherContext<H>, width: i32, height: i32) -> Result<()>
where
    H: LauncherHost + Sync + 'static,
{
    let stats = ctx.read_battery()?;
    let mut meter = ctx.battery_meter()?;
    meter.set_bounds(Rect::new(0, 0, width, height));
    HeadlessEvent::battery(stats, &meter).emit();
    Ok(())
}

/// Follow the drawer list and the battery until interrupted
pub async fn run_watch<H>(ctx: &LauncherContext<H>, width: i32, height: i32) -> Result<()>
where
    H: LauncherHost + Sync + 'static,
{
    info!("Watching applications and battery");
    let feed = ctx.drawer_feed();
    let mut drawer_rx = feed.subscribe();

    let mut meter = ctx.battery_meter()?;
    meter.set_bounds(Rect::new(0, 0, width, height));
    let mut battery_tick = interval(BATTERY_POLL_INTERVAL);
    let mut first_reading = true;

    let reason = loop {
        tokio::select! {
            result = drawer_rx.changed() => {
                if result.is_err() {
                    break "drawer feed closed";
                }
                let list = drawer_rx.borrow_and_update().clone();
                HeadlessEvent::apps(list.generation, list.apps.iter().map(|app| &**app)).emit();
            }
            _ = battery_tick.tick() => {
                match ctx.read_battery() {
                    Ok(stats) => {
                        if meter.apply_stats(&stats) || first_reading {
                            HeadlessEvent::battery(stats, &meter).emit();
                        }
                        first_reading = false;
                    }
                    Err(e) => {
                        warn!("Battery reading failed: {}", e);
                        HeadlessEvent::error(e.to_string(), false).emit();
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break "interrupted";
            }
        }
    };

    drop(feed);
    HeadlessEvent::stopped(reason).emit();
    info!("Watch stopped: {}", reason);
    Ok(())
}

fn visible_list(snapshot: Arc<AppSnapshot>, hidden: BTreeSet<String>) -> Vec<Arc<AppInfo>> {
    let mut filter = AppListFilter::new();
    filter.set_hidden_keys(hidden);
    filter.submit_snapshot(snapshot).to_vec()
}

async fn fresh_snapshot<H>(ctx: &LauncherContext<H>) -> Result<Arc<AppSnapshot>>
where
    H: LauncherHost + Sync + 'static,
{
    let mut observer = ctx.registry().observe();
    let snapshot = timeout(ENUMERATION_TIMEOUT, observer.changed())
        .await
        .map_err(|_| Error::host("Application enumeration timed out"))??;
    Ok(snapshot)
}

async fn resolve_keys<H>(ctx: &LauncherContext<H>, target: &str) -> Result<BTreeSet<String>>
where
    H: LauncherHost + Sync + 'static,
{
    if HEX_KEY.is_match(target) {
        return Ok(BTreeSet::from([target.to_string()]));
    }

    let snapshot = fresh_snapshot(ctx).await?;
    Ok(snapshot
        .apps
        .iter()
        .filter(|app| app.package_name == target)
        .map(|app| app.key().to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sml_core::{ActivityInfo, ProfileHandle};

    fn app(package: &str, label: &str) -> Arc<AppInfo> {
        Arc::new(AppInfo::new(
            ActivityInfo::new(package, format!("{}.Main", package), label),
            ProfileHandle::primary(),
        ))
    }

    #[test]
    fn test_visible_list_drops_hidden_keys_in_order() {
        let snapshot = Arc::new(AppSnapshot {
            generation: 4,
            apps: vec![
                app("org.example.a", "A"),
                app("org.example.b", "B"),
                app("org.example.c", "C"),
            ],
        });
        let hidden = BTreeSet::from([snapshot.apps[1].key().to_string()]);

        let visible = visible_list(snapshot, hidden);
        let labels: Vec<_> = visible.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "C"]);
    }

    #[test]
    fn test_hex_key_pattern() {
        assert!(HEX_KEY.is_match("e4d6aa94afabb479f855d037bc495da8"));
        assert!(!HEX_KEY.is_match("org.example.mail"));
        assert!(!HEX_KEY.is_match("E4D6AA94AFABB479F855D037BC495DA8"));
    }
}
