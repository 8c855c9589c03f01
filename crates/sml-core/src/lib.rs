//! # sml-core - Core Domain Types
//!
//! Foundation crate for smlauncher. Provides the error type, logging bootstrap,
//! color and geometry primitives, the vector path model, application
//! descriptors and the battery statistics model.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing, md-5).
//!
//! ## Public API
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ### Drawing Primitives (`color`, `geometry`, `path`)
//! - [`Color`], [`Opacity`] - Packed ARGB color and validated opacity factor
//! - [`Rect`], [`RectF`], [`PointF`], [`Insets`] - Pixel geometry
//! - [`Path`], [`PathSegment`] - Renderer-agnostic vector path
//!
//! ### Applications (`app_info`)
//! - [`AppInfo`] - One launchable activity for one user profile
//! - [`AppKey`] - Stable content-derived identity used by the hide-list
//! - [`ActivityInfo`], [`ShortcutInfo`], [`ProfileHandle`], [`IconHandle`]
//!
//! ### Battery (`battery_stats`)
//! - [`BatteryStats`] - Power supply reading with display texts
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use sml_core::prelude::*;
//! ```

pub mod app_info;
pub mod battery_stats;
pub mod color;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod path;
pub mod prelude;

// Re-export commonly used types at crate root for convenience
pub use app_info::{
    compare_labels, ActivityInfo, AppInfo, AppKey, IconHandle, ProfileHandle, ShortcutInfo,
};
pub use battery_stats::{BatteryHealth, BatteryStats, BatteryStatus, PlugSource};
pub use color::{Color, Opacity};
pub use error::{Error, Result, ResultExt};
pub use geometry::{Insets, PointF, Rect, RectF};
pub use path::{Path, PathSegment};
