//! smlauncher - launcher core with a headless command-line front-end
//!
//! This is the binary entry point. All logic lives in the library crates.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use sml_app::config::{default_config_dir, init_config_dir};
use sml_app::LauncherContext;
use smlauncher::HeadlessEvent;

/// smlauncher - application registry and battery meter for a home screen
#[derive(Parser, Debug)]
#[command(name = "smlauncher")]
#[command(about = "Launcher core: live app list, hidden apps and battery meter", long_about = None)]
struct Args {
    /// Configuration directory (defaults to <config_dir>/smlauncher)
    #[arg(long, value_name = "DIR", global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List visible apps
    Apps {
        /// Include hidden apps, each flagged
        #[arg(long)]
        all: bool,
    },
    /// Hide an app by key, or every app of a package
    Hide { target: String },
    /// Unhide an app by key, or every app of a package
    Unhide { target: String },
    /// Print the hidden-app keys
    Hidden,
    /// Print the battery reading and meter geometry
    Battery {
        #[arg(long, default_value_t = 24)]
        width: i32,
        #[arg(long, default_value_t = 48)]
        height: i32,
    },
    /// Follow the app list and the battery until interrupted
    Watch {
        #[arg(long, default_value_t = 24)]
        width: i32,
        #[arg(long, default_value_t = 48)]
        height: i32,
    },
    /// Write a default config.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    sml_core::logging::init().map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

    let config_dir = match args.config_dir {
        Some(dir) => dir,
        None => default_config_dir()?,
    };
    tracing::info!("Config directory: {}", config_dir.display());

    if let Command::Init = args.command {
        init_config_dir(&config_dir)?;
        eprintln!("Config written to {}", config_dir.display());
        return Ok(());
    }

    let ctx = match LauncherContext::desktop(&config_dir).await {
        Ok(ctx) => ctx,
        Err(e) => {
            HeadlessEvent::error(e.to_string(), true).emit();
            return Err(e.into());
        }
    };

    let result = match args.command {
        Command::Apps { all } => smlauncher::run_apps(&ctx, all).await,
        Command::Hide { target } => smlauncher::run_set_hidden(&ctx, &target, true).await,
        Command::Unhide { target } => smlauncher::run_set_hidden(&ctx, &target, false).await,
        Command::Hidden => {
            smlauncher::run_hidden(&ctx);
            Ok(())
        }
        Command::Battery { width, height } => smlauncher::run_battery(&ctx, width, height),
        Command::Watch { width, height } => smlauncher::run_watch(&ctx, width, height).await,
        Command::Init => Ok(()),
    };

    if let Err(e) = &result {
        HeadlessEvent::error(e.to_string(), true).emit();
    }
    Ok(result?)
}
