//! Launcher context: owns the long-lived services and hands them to consumers
//!
//! Constructed once at startup. The registry inside only runs while something
//! observes it, so holding a context costs nothing until a consumer attaches.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sml_core::prelude::*;
use sml_core::BatteryStats;
use sml_host::{
    default_application_dirs, DesktopHost, DesktopHostConfig, LauncherHost,
    PlatformCapabilities, SysfsBattery, DEFAULT_DEBOUNCE_MS,
};
use sml_meter::BatteryMeter;

use crate::config::{load_settings, preferences_file, Settings};
use crate::feed::DrawerFeed;
use crate::filter::{hide_list_rows, HideListRow};
use crate::preferences::PreferenceStore;
use crate::registry::{LiveApps, LiveAppsConfig};

pub struct LauncherContext<H> {
    config_dir: PathBuf,
    settings: Settings,
    capabilities: PlatformCapabilities,
    registry: LiveApps<H>,
    preferences: Arc<PreferenceStore>,
    battery: SysfsBattery,
}

impl LauncherContext<DesktopHost> {
    /// Context for a Linux desktop session
    pub async fn desktop(config_dir: &Path) -> Result<Self> {
        let settings = load_settings(config_dir);
        let battery = SysfsBattery::default();
        let capabilities = PlatformCapabilities::detect_desktop(&battery);

        let mut application_dirs = settings.launcher.application_dirs.clone();
        application_dirs.extend(default_application_dirs());
        let host = DesktopHost::new(
            DesktopHostConfig {
                application_dirs,
                host_package: settings.launcher.host_package.clone(),
                debounce: std::time::Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            },
            capabilities,
        );

        let preferences = PreferenceStore::open(preferences_file(config_dir)).await?;
        Ok(Self::new(
            config_dir,
            settings,
            capabilities,
            Arc::new(host),
            preferences,
            battery,
        ))
    }
}

impl<H> LauncherContext<H>
where
    H: LauncherHost + Sync + 'static,
{
    pub fn new(
        config_dir: &Path,
        settings: Settings,
        capabilities: PlatformCapabilities,
        host: Arc<H>,
        preferences: PreferenceStore,
        battery: SysfsBattery,
    ) -> Self {
        let registry = LiveApps::new(
            host,
            LiveAppsConfig {
                icon_density: settings.launcher.icon_density,
            },
        );
        Self {
            config_dir: config_dir.to_path_buf(),
            settings,
            capabilities,
            registry,
            preferences: Arc::new(preferences),
            battery,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn capabilities(&self) -> &PlatformCapabilities {
        &self.capabilities
    }

    pub fn registry(&self) -> &LiveApps<H> {
        &self.registry
    }

    pub fn preferences(&self) -> &Arc<PreferenceStore> {
        &self.preferences
    }

    /// Drawer list that follows both the registry and the hidden set
    pub fn drawer_feed(&self) -> DrawerFeed {
        DrawerFeed::spawn(
            self.registry.observe(),
            self.preferences.observe_hidden_apps(),
        )
    }

    /// Every app with its hidden flag, from one enumeration
    pub async fn hide_list(&self) -> Result<Vec<HideListRow>> {
        let was_active = self.registry.is_active();
        let mut observer = self.registry.observe();
        // an idle registry still holds the list from its last run
        let snapshot = if was_active {
            observer.current().await?
        } else {
            observer.changed().await?
        };
        Ok(hide_list_rows(&snapshot, &self.preferences.hidden_apps()))
    }

    pub fn read_battery(&self) -> Result<BatteryStats> {
        self.battery.read_stats()
    }

    /// Meter configured from settings and fed the current battery reading
    pub fn battery_meter(&self) -> Result<BatteryMeter> {
        let mut meter = self.settings.battery.meter()?;
        match self.read_battery() {
            Ok(stats) => {
                meter.apply_stats(&stats);
            }
            Err(e) => warn!("Battery reading unavailable: {}", e),
        }
        Ok(meter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sml_core::ProfileHandle;
    use sml_host::test_utils::{test_activity, FakeHost};
    use tempfile::TempDir;

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

    #[tokio::test]
    async fn test_hide_list_marks_hidden_apps() {
        let temp = TempDir::new().unwrap();
        let host = Arc::new(FakeHost::new());
        host.set_activities(
            ProfileHandle::primary(),
            vec![
                test_activity("org.example.a", "A"),
                test_activity("org.example.b", "B"),
            ],
        );
        let ctx = context(&temp, Arc::clone(&host)).await;

        let rows = ctx.hide_list().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| !r.hidden));

        ctx.preferences().add_hidden_app(&rows[0].key).await.unwrap();
        let rows = ctx.hide_list().await.unwrap();
        assert!(rows[0].hidden);
        assert!(!rows[1].hidden);

        // the registry stops once the hide list is built
        assert!(!ctx.registry().is_active());
    }

    #[tokio::test]
    async fn test_hide_list_reports_failed_enumeration() {
        let temp = TempDir::new().unwrap();
        let host = Arc::new(FakeHost::new());
        host.set_activities(
            ProfileHandle::primary(),
            vec![test_activity("org.example.a", "A")],
        );
        host.set_fail_enumeration(true);
        let ctx = context(&temp, Arc::clone(&host)).await;

        let result = tokio::time::timeout(std::time::Duration::from_secs(2), ctx.hide_list())
            .await
            .expect("hide list must not wait forever");
        assert!(matches!(result, Err(Error::Enumeration { .. })));
        assert!(!ctx.registry().is_active());

        host.set_fail_enumeration(false);
        let rows = ctx.hide_list().await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_battery_meter_without_battery() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp, Arc::new(FakeHost::new())).await;
        let meter = ctx.battery_meter().unwrap();
        assert_eq!(meter.state().charge_level, None);
        assert!(ctx.capabilities().expand_status_bar().is_err());
    }
}
