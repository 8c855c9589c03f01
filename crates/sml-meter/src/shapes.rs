//! Built-in battery glyphs as literal ratio coordinates
//!
//! These are the rounded theme's outlines spelled out in code. The bundled
//! `battery_shapes_rounded.bin` resource encodes exactly these commands.

use crate::shape_data::{ShapeBlock, ShapeCommand, ShapeCommands, ShapeSource};

use ShapeCommand::{Close, CubicTo, LineTo, MoveTo};

const fn m(x: f32, y: f32) -> ShapeCommand {
    MoveTo { x, y }
}

const fn l(x: f32, y: f32) -> ShapeCommand {
    LineTo { x, y }
}

const fn c(x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> ShapeCommand {
    CubicTo {
        x1,
        y1,
        x2,
        y2,
        x3,
        y3,
    }
}

pub const BATTERY: &[ShapeCommand] = &[
    m(0.87, 0.1),
    l(0.7, 0.1),
    l(0.7, 0.05),
    c(0.7, 0.025, 0.66, 0.0, 0.6, 0.0),
    l(0.4, 0.0),
    c(0.34, 0.0, 0.3, 0.025, 0.3, 0.05),
    l(0.3, 0.1),
    l(0.13, 0.1),
    c(0.06, 0.1, 0.0, 0.13, 0.0, 0.165),
    l(0.0, 0.935),
    c(0.0, 0.975, 0.06, 1.0, 0.13, 1.0),
    l(0.87, 1.0),
    c(0.94, 1.0, 1.0, 0.97, 1.0, 0.935),
    l(1.0, 0.165),
    c(1.01, 0.13, 0.94, 0.1, 0.87, 0.1),
    Close,
];

pub const ALERT: &[ShapeCommand] = &[
    m(0.6, 0.8),
    l(0.4, 0.8),
    l(0.4, 0.7),
    l(0.6, 0.7),
    l(0.6, 0.8),
    Close,
    m(0.6, 0.55),
    c(0.6, 0.58, 0.56, 0.6, 0.5, 0.6),
    c(0.44, 0.6, 0.4, 0.58, 0.4, 0.55),
    l(0.4, 0.4),
    c(0.4, 0.37, 0.44, 0.35, 0.5, 0.35),
    c(0.56, 0.35, 0.6, 0.37, 0.6, 0.4),
    l(0.6, 0.55),
    Close,
];

pub const CHARGING: &[ShapeCommand] = &[
    m(0.76, 0.56),
    l(0.49, 0.81),
    c(0.47, 0.835, 0.4, 0.825, 0.4, 0.8),
    l(0.4, 0.625),
    l(0.28, 0.625),
    c(0.24, 0.625, 0.22, 0.605, 0.24, 0.59),
    l(0.51, 0.34),
    c(0.53, 0.315, 0.6, 0.325, 0.6, 0.35),
    l(0.6, 0.525),
    l(0.72, 0.525),
    c(0.75, 0.525, 0.78, 0.545, 0.76, 0.56),
    Close,
];

pub const UNKNOWN: &[ShapeCommand] = &[
    m(0.6, 0.8),
    l(0.4, 0.8),
    l(0.4, 0.7),
    l(0.6, 0.7),
    Close,
    m(0.73, 0.5345),
    c(0.73, 0.5345, 0.692, 0.5555, 0.663, 0.57),
    c(0.649, 0.577, 0.636, 0.585, 0.624, 0.5935),
    l(0.615, 0.601),
    c(0.607, 0.607, 0.601, 0.6135, 0.596, 0.6195),
    c(0.587, 0.6305, 0.58, 0.641, 0.58, 0.65),
    l(0.42, 0.65),
    c(0.42, 0.629, 0.432, 0.61, 0.449, 0.5935),
    l(0.449, 0.5935),
    c(0.455, 0.588, 0.462, 0.583, 0.469, 0.578),
    c(0.472, 0.5755, 0.475, 0.5725, 0.479, 0.57),
    c(0.49, 0.563, 0.502, 0.556, 0.513, 0.55),
    l(0.606, 0.503),
    c(0.633, 0.4895, 0.65, 0.4705, 0.65, 0.45),
    c(0.65, 0.4085, 0.583, 0.375, 0.5, 0.375),
    c(0.435, 0.375, 0.379, 0.3955, 0.359, 0.4245),
    c(0.348, 0.44, 0.32, 0.45, 0.288, 0.45),
    c(0.236, 0.45, 0.2, 0.424, 0.217, 0.3995),
    c(0.259, 0.3415, 0.369, 0.3, 0.5, 0.3),
    c(0.666, 0.3, 0.8, 0.367, 0.8, 0.45),
    c(0.8, 0.483, 0.773, 0.513, 0.73, 0.5345),
    Close,
];

/// The rounded glyph set held as static tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiteralShapes;

impl LiteralShapes {
    pub const ASPECT_RATIO: f32 = 0.5;

    pub fn table(block: ShapeBlock) -> &'static [ShapeCommand] {
        match block {
            ShapeBlock::Battery => BATTERY,
            ShapeBlock::Alert => ALERT,
            ShapeBlock::Charging => CHARGING,
            ShapeBlock::Unknown => UNKNOWN,
        }
    }
}

impl ShapeSource for LiteralShapes {
    fn aspect_ratio(&self) -> f32 {
        Self::ASPECT_RATIO
    }

    fn commands(&self, block: ShapeBlock) -> ShapeCommands<'_> {
        ShapeCommands::Literal(Self::table(block).iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_starts_with_move_and_ends_closed() {
        for block in ShapeBlock::ALL {
            let table = LiteralShapes::table(block);
            assert!(matches!(table.first(), Some(MoveTo { .. })), "{block}");
            assert_eq!(table.last(), Some(&Close), "{block}");
        }
    }

    #[test]
    fn test_glyphs_have_two_subpaths_except_charging() {
        let subpaths = |block| {
            LiteralShapes::table(block)
                .iter()
                .filter(|c| matches!(c, MoveTo { .. }))
                .count()
        };
        assert_eq!(subpaths(ShapeBlock::Battery), 1);
        assert_eq!(subpaths(ShapeBlock::Alert), 2);
        assert_eq!(subpaths(ShapeBlock::Charging), 1);
        assert_eq!(subpaths(ShapeBlock::Unknown), 2);
    }
}
