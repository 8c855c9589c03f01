//! Configuration file handling for smlauncher
//!
//! Supports:
//! - `<config_dir>/smlauncher/config.toml` - Launcher and battery settings
//! - `<config_dir>/smlauncher/preferences.toml` - Path only; see [`crate::preferences`]

pub mod settings;
pub mod types;

pub use settings::{
    config_file, default_config_dir, init_config_dir, load_settings, preferences_file,
    save_settings, PREFERENCES_FILENAME,
};
pub use types::*;
