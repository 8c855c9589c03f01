//! Settings parser for `<config_dir>/smlauncher/config.toml`

use std::path::{Path, PathBuf};

use super::types::Settings;
use sml_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "smlauncher";

/// File the preference store persists to, next to `config.toml`
pub const PREFERENCES_FILENAME: &str = "preferences.toml";

/// `<config_dir>/smlauncher`, e.g. `~/.config/smlauncher` on Linux
pub fn default_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| Error::config("No user configuration directory on this system"))
}

/// Path of `config.toml` inside a config directory
pub fn config_file(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILENAME)
}

/// Path of the preference file inside a config directory
pub fn preferences_file(config_dir: &Path) -> PathBuf {
    config_dir.join(PREFERENCES_FILENAME)
}

/// Load settings from `config.toml`, defaults if missing or invalid
pub fn load_settings(config_dir: &Path) -> Settings {
    let config_path = config_file(config_dir);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create the config directory with a commented default `config.toml`
pub fn init_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir)
            .map_err(|e| Error::config(format!("Failed to create config dir: {}", e)))?;
    }

    let config_path = config_file(config_dir);
    if !config_path.exists() {
        let default_content = r##"# smlauncher configuration

[launcher]
host_package = "smlauncher"   # Own desktop-file id, never listed
icon_density = 160            # dpi used to pick icon sizes
application_dirs = []         # Searched before the XDG application dirs

[battery]
theme = "sharp"               # "sharp" or "rounded"
critical_alert = true
critical_level = 10           # Alert glyph at or below this level
color = "#FFFFFFFF"           # #AARRGGBB or #RRGGBB
indicator_color = "#00000000"
# charging_color = "#FF4CAF50"
# critical_color = "#FFF44336"
# unknown_color = "#FF9E9E9E"
intrinsic_size = 48
"##;
        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
        info!("Created default config at {:?}", config_path);
    }

    Ok(())
}

/// Save settings to `config.toml`
///
/// Writes to a temp file first, then renames over the old file.
pub fn save_settings(config_dir: &Path, settings: &Settings) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir)
            .map_err(|e| Error::config(format!("Failed to create config dir: {}", e)))?;
    }

    let config_path = config_file(config_dir);
    let temp_path = config_dir.join(".config.toml.tmp");

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;
    let full_content = format!("{}{}", generate_config_header(), content);

    std::fs::write(&temp_path, &full_content)
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;

    std::fs::rename(&temp_path, &config_path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    info!("Saved settings to {:?}", config_path);
    Ok(())
}

fn generate_config_header() -> String {
    "# smlauncher configuration\n# Generated by smlauncher\n\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use sml_meter::Theme;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load_settings(temp.path()), Settings::default());
    }

    #[test]
    fn test_load_malformed_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(config_file(temp.path()), "[battery\ntheme = ").unwrap();
        assert_eq!(load_settings(temp.path()), Settings::default());
    }

    #[test]
    fn test_init_writes_loadable_defaults() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("smlauncher");
        init_config_dir(&dir).unwrap();

        let settings = load_settings(&dir);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(config_file(temp.path()), "[battery]\ntheme = \"rounded\"\n").unwrap();
        init_config_dir(temp.path()).unwrap();
        assert_eq!(load_settings(temp.path()).battery.theme, Theme::Rounded);
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.battery.theme = Theme::Rounded;
        settings.battery.critical_level = 15;
        settings.launcher.application_dirs = vec![PathBuf::from("/opt/apps")];

        save_settings(temp.path(), &settings).unwrap();

        let content = std::fs::read_to_string(config_file(temp.path())).unwrap();
        assert!(content.starts_with("# smlauncher configuration"));
        assert!(!temp.path().join(".config.toml.tmp").exists());
        assert_eq!(load_settings(temp.path()), settings);
    }

    #[test]
    #[serial]
    fn test_default_config_dir_follows_xdg() {
        let temp = TempDir::new().unwrap();
        let previous = std::env::var_os("XDG_CONFIG_HOME");
        std::env::set_var("XDG_CONFIG_HOME", temp.path());

        let dir = default_config_dir();

        match previous {
            Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
        if cfg!(target_os = "linux") {
            assert_eq!(dir.unwrap(), temp.path().join("smlauncher"));
        }
    }
}
