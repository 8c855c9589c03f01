//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable that overrides the log filter
pub const LOG_ENV_VAR: &str = "SMLAUNCHER_LOG";

const LOG_FILE_NAME: &str = "smlauncher.log";

/// Launcher crates logged at `info` by default; everything else at `warn`
pub const LAUNCHER_TARGETS: &[&str] = &["smlauncher", "sml_app", "sml_host", "sml_meter"];

/// Filter directives used when `SMLAUNCHER_LOG` is unset or invalid
pub fn default_filter() -> String {
    let mut directives: Vec<String> = LAUNCHER_TARGETS
        .iter()
        .map(|target| format!("{}=info", target))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/smlauncher/logs/`
/// Log level is controlled by `SMLAUNCHER_LOG` environment variable.
///
/// # Examples
/// ```bash
/// SMLAUNCHER_LOG=debug smlauncher watch
/// SMLAUNCHER_LOG=sml_app=trace smlauncher apps
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_filter()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!(
        "smlauncher {} starting, log directory: {}",
        env!("CARGO_PKG_VERSION"),
        log_dir.display()
    );

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("smlauncher").join("logs"))
}

/// Get the log file path for the current day
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    Ok(dir.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_launcher_crates() {
        let filter = default_filter();
        assert_eq!(
            filter,
            "smlauncher=info,sml_app=info,sml_host=info,sml_meter=info,warn"
        );
        assert!(EnvFilter::try_new(&filter).is_ok());
    }

    #[test]
    fn test_log_file_lives_under_launcher_dir() {
        let path = get_current_log_file().unwrap();
        assert!(path.ends_with("smlauncher/logs/smlauncher.log"));
    }
}
