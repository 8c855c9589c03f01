//! smlauncher Library
//!
//! Headless front-end for the launcher core: every command emits NDJSON events.

pub mod headless;

pub use headless::runner::{run_apps, run_battery, run_hidden, run_set_hidden, run_watch};
pub use headless::HeadlessEvent;
