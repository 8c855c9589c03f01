//! Battery state to geometry and paint colors
//!
//! Everything here is a pure function of a [`BatteryState`], a shape source
//! and the resolved shape bounds.

use serde::Serialize;
use sml_core::{Color, Opacity, Path, Rect, RectF};

use crate::shape_data::{ShapeBlock, ShapeSource};
use crate::state::{BatteryState, Indicator, MAXIMUM_CHARGE_LEVEL, MINIMUM_CHARGE_LEVEL};

/// Resolved paint colors for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paints {
    /// Battery body drawn beneath the fill
    pub body: Color,
    /// Charge level fill
    pub fill: Color,
    pub indicator: Color,
}

/// Derived artifacts for one state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterGeometry {
    pub shape_bounds: Rect,
    pub outline: Path,
    pub indicator_kind: Indicator,
    pub indicator: Path,
    pub fill_clip: RectF,
    pub paints: Paints,
}

impl Default for MeterGeometry {
    fn default() -> Self {
        Self {
            shape_bounds: Rect::default(),
            outline: Path::new(),
            indicator_kind: Indicator::Unknown,
            indicator: Path::new(),
            fill_clip: RectF::default(),
            paints: Paints {
                body: Color::TRANSPARENT,
                fill: Color::TRANSPARENT,
                indicator: Color::TRANSPARENT,
            },
        }
    }
}

/// Paint colors for the body, the fill and the glyph.
///
/// Unknown charge paints the body opaque with the unknown color (or the base
/// color). Charging and critical states swap in their color when one is set.
pub fn paint_colors(state: &BatteryState) -> Paints {
    let colors = &state.colors;
    let translucent = |color: Color| color.with_opacity(Opacity::BATTERY_BODY);

    let mut fill = colors.color;
    let mut body = translucent(colors.color);

    let substitute = match state.indicator() {
        Indicator::Unknown => {
            body = colors.unknown_color.unwrap_or(colors.color);
            None
        }
        Indicator::Charging => colors.charging_color,
        Indicator::Alert => colors.critical_color,
        Indicator::None => None,
    };

    if let Some(color) = substitute {
        fill = color;
        body = translucent(color);
    }

    Paints {
        body,
        fill,
        indicator: colors.indicator_color,
    }
}

/// Clip rectangle for the fill; its top edge drops as the charge falls.
///
/// Unknown charge counts as empty, which leaves a zero-height clip.
pub fn fill_clip(shape_bounds: Rect, charge_level: Option<u8>) -> RectF {
    let level = charge_level.unwrap_or(MINIMUM_CHARGE_LEVEL);
    let mut clip = shape_bounds.to_rect_f();
    clip.top += clip.height() * (1.0 - f32::from(level) / f32::from(MAXIMUM_CHARGE_LEVEL));
    clip
}

/// Project a state into outline, glyph, fill clip and paints
pub fn project<S>(state: &BatteryState, shapes: &S, shape_bounds: Rect) -> MeterGeometry
where
    S: ShapeSource + ?Sized,
{
    let mut outline = Path::new();
    shapes.build_path(ShapeBlock::Battery, shape_bounds, &mut outline);

    let indicator_kind = state.indicator();
    let mut indicator = Path::new();
    if let Some(block) = indicator_kind.block() {
        shapes.build_path(block, shape_bounds, &mut indicator);
    }

    MeterGeometry {
        shape_bounds,
        outline,
        indicator_kind,
        indicator,
        fill_clip: fill_clip(shape_bounds, state.charge_level),
        paints: paint_colors(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::LiteralShapes;
    use crate::state::MeterColors;

    const BASE: Color = Color::from_argb_u32(0xFF10_2030);
    const CHARGING: Color = Color::from_argb_u32(0xFF00_FF00);
    const CRITICAL: Color = Color::from_argb_u32(0xFFFF_0000);

    fn colors() -> MeterColors {
        MeterColors {
            color: BASE,
            ..Default::default()
        }
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn test_critical_scenario() {
        let state = BatteryState::default()
            .with_colors(colors())
            .with_charge_level(Some(8))
            .with_critical_level(Some(15));
        let bounds = Rect::from_size(50, 100);
        let geometry = project(&state, &LiteralShapes, bounds);

        assert_eq!(geometry.indicator_kind, Indicator::Alert);
        assert!(!geometry.indicator.is_empty());
        assert_close(geometry.fill_clip.top, 92.0);
        assert_close(geometry.fill_clip.bottom, 100.0);
    }

    #[test]
    fn test_unknown_scenario() {
        let state = BatteryState::default().with_colors(colors());
        let geometry = project(&state, &LiteralShapes, Rect::from_size(50, 100));

        assert_eq!(geometry.indicator_kind, Indicator::Unknown);
        assert!(geometry.fill_clip.is_empty());
        // body is not made translucent when the charge is unknown
        assert_eq!(geometry.paints.body, BASE);
        assert_eq!(geometry.paints.fill, BASE);
    }

    #[test]
    fn test_unknown_color_paints_body() {
        let unknown = Color::from_argb_u32(0x80AA_AAAA);
        let state = BatteryState::default().with_colors(MeterColors {
            unknown_color: Some(unknown),
            ..colors()
        });
        assert_eq!(paint_colors(&state).body, unknown);
    }

    #[test]
    fn test_charging_color_scenario() {
        let state = BatteryState::default()
            .with_colors(MeterColors {
                charging_color: Some(CHARGING),
                critical_color: Some(CRITICAL),
                ..colors()
            })
            .with_charge_level(Some(50))
            .with_charging(true);

        let paints = paint_colors(&state);
        assert_eq!(paints.fill, CHARGING);
        assert_eq!(paints.body.argb() & 0x00FF_FFFF, 0x0000_FF00);
        assert_eq!(paints.body.alpha(), 77);
    }

    #[test]
    fn test_charging_without_color_uses_base() {
        let state = BatteryState::default()
            .with_colors(colors())
            .with_charge_level(Some(50))
            .with_charging(true);

        let paints = paint_colors(&state);
        assert_eq!(paints.fill, BASE);
        assert_eq!(paints.body, BASE.with_opacity(Opacity::BATTERY_BODY));
    }

    #[test]
    fn test_critical_color_substitution() {
        let state = BatteryState::default()
            .with_colors(MeterColors {
                critical_color: Some(CRITICAL),
                ..colors()
            })
            .with_charge_level(Some(3));

        let paints = paint_colors(&state);
        assert_eq!(paints.fill, CRITICAL);
        assert_eq!(paints.body, CRITICAL.with_opacity(Opacity::BATTERY_BODY));
    }

    #[test]
    fn test_normal_state_has_no_indicator() {
        let state = BatteryState::default()
            .with_colors(colors())
            .with_charge_level(Some(80));
        let geometry = project(&state, &LiteralShapes, Rect::from_size(50, 100));

        assert_eq!(geometry.indicator_kind, Indicator::None);
        assert!(geometry.indicator.segments().is_empty());
        assert_close(geometry.fill_clip.top, 20.0);
    }

    #[test]
    fn test_full_charge_clip_covers_shape() {
        let clip = fill_clip(Rect::new(10, 20, 60, 120), Some(100));
        assert_eq!(clip, RectF::new(10.0, 20.0, 60.0, 120.0));
    }

    #[test]
    fn test_geometry_scales_linearly() {
        let state = BatteryState::default().with_charge_level(Some(40));
        let unit = project(&state, &LiteralShapes, Rect::from_size(10, 20));

        for k in [2, 3, 7] {
            let scaled = project(&state, &LiteralShapes, Rect::from_size(10 * k, 20 * k));
            let pairs = unit.outline.points().zip(scaled.outline.points());
            for (a, b) in pairs {
                assert_close(a.x * k as f32, b.x);
                assert_close(a.y * k as f32, b.y);
            }
            assert_close(unit.fill_clip.top * k as f32, scaled.fill_clip.top);
        }
    }
}
