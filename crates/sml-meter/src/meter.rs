//! Stateful battery meter
//!
//! [`BatteryMeter`] owns a [`BatteryState`], the outer bounds and padding, and
//! the geometry derived from them. Every change goes through an explicit
//! update that recomputes the geometry synchronously and marks the meter for
//! repaint; nothing is batched.

use serde::Serialize;
use sml_core::prelude::*;
use sml_core::{BatteryStats, Color, Insets, Path, Rect, RectF};

use crate::bounds::resolve_shape_bounds;
use crate::projection::{project, MeterGeometry};
use crate::shape_data::{ShapeBlock, ShapeCommands, ShapeData, ShapeSource};
use crate::shapes::LiteralShapes;
use crate::state::{BatteryState, MeterColors};
use crate::theme::Theme;

/// Default edge length of the meter's longer side, in pixels
pub const DEFAULT_INTRINSIC_SIZE: i32 = 48;

/// One step of the meter's drawing sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp<'a> {
    Save,
    DrawPath { path: &'a Path, color: Color },
    ClipOutPath { path: &'a Path },
    ClipRect { rect: RectF },
    Restore,
}

#[derive(Debug, Clone)]
enum Shapes {
    Themed(ShapeData),
    Literal(LiteralShapes),
}

impl ShapeSource for Shapes {
    fn aspect_ratio(&self) -> f32 {
        match self {
            Shapes::Themed(data) => data.aspect_ratio(),
            Shapes::Literal(literal) => literal.aspect_ratio(),
        }
    }

    fn commands(&self, block: ShapeBlock) -> ShapeCommands<'_> {
        match self {
            Shapes::Themed(data) => data.commands(block),
            Shapes::Literal(literal) => literal.commands(block),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatteryMeter {
    state: BatteryState,
    shapes: Shapes,
    bounds: Rect,
    padding: Insets,
    intrinsic_size: i32,
    geometry: MeterGeometry,
    needs_repaint: bool,
    repaints: u64,
}

impl BatteryMeter {
    /// Meter drawing one of the bundled binary themes
    pub fn new(theme: Theme) -> Result<Self> {
        let shapes = Shapes::Themed(theme.load()?);
        let state = BatteryState::default().with_theme(theme);
        Ok(Self::with_shapes(shapes, state))
    }

    /// Meter drawing the rounded glyphs from static tables.
    ///
    /// The theme field of its state is kept but does not change the shapes.
    pub fn literal() -> Self {
        let state = BatteryState::default().with_theme(Theme::Rounded);
        Self::with_shapes(Shapes::Literal(LiteralShapes), state)
    }

    fn with_shapes(shapes: Shapes, state: BatteryState) -> Self {
        let mut meter = Self {
            state,
            shapes,
            bounds: Rect::default(),
            padding: Insets::ZERO,
            intrinsic_size: DEFAULT_INTRINSIC_SIZE,
            geometry: MeterGeometry::default(),
            needs_repaint: false,
            repaints: 0,
        };
        meter.recompute();
        meter
    }

    pub fn with_intrinsic_size(mut self, size: i32) -> Self {
        self.intrinsic_size = size.max(0);
        self
    }

    pub fn state(&self) -> &BatteryState {
        &self.state
    }

    pub fn geometry(&self) -> &MeterGeometry {
        &self.geometry
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.shapes.aspect_ratio()
    }

    // ─────────────────────────────────────────────────────────────
    // State updates
    // ─────────────────────────────────────────────────────────────

    /// Replace the whole state and return the derived geometry.
    ///
    /// Levels are clamped. A theme change reloads the shape resource, which
    /// is the only way this can fail; on failure the meter is unchanged.
    pub fn apply_state(&mut self, state: BatteryState) -> Result<&MeterGeometry> {
        let state = state.clamped();
        if state == self.state {
            return Ok(&self.geometry);
        }

        if state.theme != self.state.theme {
            if let Shapes::Themed(_) = self.shapes {
                self.shapes = Shapes::Themed(state.theme.load()?);
                debug!("Battery meter theme switched to {}", state.theme);
            }
        }

        self.state = state;
        self.recompute();
        self.invalidate();
        Ok(&self.geometry)
    }

    fn commit(&mut self, state: BatteryState) -> bool {
        if state == self.state {
            return false;
        }
        self.state = state;
        self.recompute();
        self.invalidate();
        true
    }

    /// Returns whether anything changed
    pub fn set_charge_level(&mut self, level: Option<i32>) -> bool {
        let next = self.state.clone().with_charge_level(level);
        self.commit(next)
    }

    pub fn set_critical_level(&mut self, level: Option<i32>) -> bool {
        let next = self.state.clone().with_critical_level(level);
        self.commit(next)
    }

    pub fn set_charging(&mut self, charging: bool) -> bool {
        let next = self.state.clone().with_charging(charging);
        self.commit(next)
    }

    pub fn set_colors(&mut self, colors: MeterColors) -> bool {
        let next = self.state.clone().with_colors(colors);
        self.commit(next)
    }

    pub fn set_color(&mut self, color: Color) -> bool {
        self.set_colors(MeterColors {
            color,
            ..self.state.colors
        })
    }

    pub fn set_indicator_color(&mut self, indicator_color: Color) -> bool {
        self.set_colors(MeterColors {
            indicator_color,
            ..self.state.colors
        })
    }

    pub fn set_charging_color(&mut self, charging_color: Option<Color>) -> bool {
        self.set_colors(MeterColors {
            charging_color,
            ..self.state.colors
        })
    }

    pub fn set_critical_color(&mut self, critical_color: Option<Color>) -> bool {
        self.set_colors(MeterColors {
            critical_color,
            ..self.state.colors
        })
    }

    pub fn set_unknown_color(&mut self, unknown_color: Option<Color>) -> bool {
        self.set_colors(MeterColors {
            unknown_color,
            ..self.state.colors
        })
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<bool> {
        if theme == self.state.theme {
            return Ok(false);
        }
        let next = self.state.clone().with_theme(theme);
        self.apply_state(next)?;
        Ok(true)
    }

    /// Feed a battery reading into the meter
    pub fn apply_stats(&mut self, stats: &BatteryStats) -> bool {
        let (level, charging) = stats.meter_input();
        let next = self
            .state
            .clone()
            .with_charge_level(level.map(i32::from))
            .with_charging(charging);
        self.commit(next)
    }

    // ─────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────

    pub fn set_bounds(&mut self, bounds: Rect) -> bool {
        if bounds == self.bounds {
            return false;
        }
        self.bounds = bounds;
        self.recompute();
        self.invalidate();
        true
    }

    pub fn set_padding(&mut self, padding: Insets) -> bool {
        if padding == self.padding {
            return false;
        }
        self.padding = padding;
        self.recompute();
        self.invalidate();
        true
    }

    /// Padding given as start/end, resolved against the layout direction
    pub fn set_padding_relative(
        &mut self,
        start: i32,
        top: i32,
        end: i32,
        bottom: i32,
        rtl: bool,
    ) -> bool {
        self.set_padding(Insets::relative(start, top, end, bottom, rtl))
    }

    /// Preferred width: the shorter side is scaled by the aspect ratio
    pub fn intrinsic_width(&self) -> i32 {
        let aspect_ratio = self.aspect_ratio();
        let width = if aspect_ratio < 1.0 {
            (self.intrinsic_size as f32 * aspect_ratio) as i32
        } else {
            self.intrinsic_size
        };
        width + self.padding.horizontal()
    }

    pub fn intrinsic_height(&self) -> i32 {
        let aspect_ratio = self.aspect_ratio();
        let height = if aspect_ratio < 1.0 {
            self.intrinsic_size
        } else {
            (self.intrinsic_size as f32 / aspect_ratio) as i32
        };
        height + self.padding.vertical()
    }

    fn recompute(&mut self) {
        // empty bounds keep the last resolved shape bounds
        let shape_bounds = resolve_shape_bounds(self.bounds, self.padding, self.aspect_ratio())
            .unwrap_or(self.geometry.shape_bounds);
        self.geometry = project(&self.state, &self.shapes, shape_bounds);
        trace!(
            "Battery meter recomputed: {:?} indicator, clip top {}",
            self.geometry.indicator_kind,
            self.geometry.fill_clip.top
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Drawing
    // ─────────────────────────────────────────────────────────────

    fn invalidate(&mut self) {
        self.needs_repaint = true;
        self.repaints += 1;
    }

    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    /// Clear the repaint flag, returning whether it was set
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.needs_repaint)
    }

    /// Number of repaint requests since construction
    pub fn repaint_count(&self) -> u64 {
        self.repaints
    }

    /// The drawing sequence for the current geometry.
    ///
    /// The glyph is drawn first and then clipped out so the body and fill
    /// leave a hole where it sits.
    pub fn draw(&self) -> Vec<DrawOp<'_>> {
        let geometry = &self.geometry;
        let mut ops = vec![DrawOp::Save];

        if !geometry.indicator.is_empty() {
            ops.push(DrawOp::DrawPath {
                path: &geometry.indicator,
                color: geometry.paints.indicator,
            });
            ops.push(DrawOp::ClipOutPath {
                path: &geometry.indicator,
            });
        }

        ops.push(DrawOp::DrawPath {
            path: &geometry.outline,
            color: geometry.paints.body,
        });

        if !geometry.fill_clip.is_empty() {
            ops.push(DrawOp::ClipRect {
                rect: geometry.fill_clip,
            });
            ops.push(DrawOp::DrawPath {
                path: &geometry.outline,
                color: geometry.paints.fill,
            });
        }

        ops.push(DrawOp::Restore);
        ops
    }
}
