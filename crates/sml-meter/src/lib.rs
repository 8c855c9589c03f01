//! # sml-meter - Vector Battery Meter
//!
//! Renders a battery icon from compact path-command shapes. The meter keeps a
//! small state (charge level, charging flag, critical threshold, colors and
//! theme) and derives an outline, an optional glyph and a fill clip whenever
//! that state or its bounds change.
//!
//! Depends on [`sml_core`] for geometry, colors and error handling.
//!
//! ## Public API
//!
//! ### Shape Resources
//! - [`ShapeData`] - Validated binary shape resource, replayed per block
//! - [`ShapeSource`] - Anything that supplies the four glyph blocks
//! - [`LiteralShapes`] - The rounded glyphs as static ratio tables
//! - [`Theme`] - Bundled shape resources (sharp, rounded)
//!
//! ### Geometry
//! - [`resolve_shape_bounds()`] - Fit the outline into bounds minus padding
//! - [`project()`] - Pure state to geometry and paints projection
//! - [`BatteryState`], [`MeterColors`], [`Indicator`] - Meter inputs
//!
//! ### Meter
//! - [`BatteryMeter`] - Owns state and geometry, produces a [`DrawOp`] list

pub mod bounds;
pub mod meter;
pub mod projection;
pub mod shape_data;
pub mod shapes;
pub mod state;
pub mod theme;

pub use bounds::resolve_shape_bounds;
pub use meter::{BatteryMeter, DrawOp, DEFAULT_INTRINSIC_SIZE};
pub use projection::{fill_clip, paint_colors, project, MeterGeometry, Paints};
pub use shape_data::{encode, ShapeBlock, ShapeCommand, ShapeCommands, ShapeData, ShapeSource};
pub use shapes::LiteralShapes;
pub use state::{
    clamp_level, BatteryState, Indicator, MeterColors, CRITICAL_CHARGE_LEVEL,
    MAXIMUM_CHARGE_LEVEL, MINIMUM_CHARGE_LEVEL,
};
pub use theme::Theme;
