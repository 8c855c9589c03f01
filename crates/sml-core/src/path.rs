//! Renderer-agnostic vector path

use serde::Serialize;

use crate::geometry::{PointF, RectF};

/// One segment of a [`Path`], in absolute coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathSegment {
    MoveTo { to: PointF },
    LineTo { to: PointF },
    CubicTo { c1: PointF, c2: PointF, to: PointF },
    Close,
}

/// A sequence of subpaths built from move/line/cubic/close segments
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all segments, keeping the allocation
    pub fn reset(&mut self) {
        self.segments.clear();
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.segments.push(PathSegment::MoveTo {
            to: PointF::new(x, y),
        });
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.segments.push(PathSegment::LineTo {
            to: PointF::new(x, y),
        });
    }

    pub fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        self.segments.push(PathSegment::CubicTo {
            c1: PointF::new(x1, y1),
            c2: PointF::new(x2, y2),
            to: PointF::new(x3, y3),
        });
    }

    pub fn close(&mut self) {
        self.segments.push(PathSegment::Close);
    }

    /// A path with no drawing segments is empty
    pub fn is_empty(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, PathSegment::MoveTo { .. } | PathSegment::Close))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Every coordinate in the path, control points included, in order
    pub fn points(&self) -> impl Iterator<Item = PointF> + '_ {
        self.segments.iter().flat_map(|segment| {
            let points: Vec<PointF> = match *segment {
                PathSegment::MoveTo { to } | PathSegment::LineTo { to } => vec![to],
                PathSegment::CubicTo { c1, c2, to } => vec![c1, c2, to],
                PathSegment::Close => Vec::new(),
            };
            points
        })
    }

    /// Bounds of all points including cubic control points
    pub fn control_bounds(&self) -> Option<RectF> {
        let mut points = self.points();
        let first = points.next()?;
        let init = RectF::new(first.x, first.y, first.x, first.y);
        Some(points.fold(init, |acc, p| {
            RectF::new(
                acc.left.min(p.x),
                acc.top.min(p.y),
                acc.right.max(p.x),
                acc.bottom.max(p.y),
            )
        }))
    }
}
