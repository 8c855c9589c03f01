//! Fitting the battery outline into its bounds

use sml_core::{Insets, Rect};

/// Largest rectangle with `aspect_ratio` (width / height) that fits inside
/// `bounds` minus `padding`, centered in the available area.
///
/// Returns `None` when there is nothing to fit into: empty bounds, padding
/// that consumes the whole area, or a non-positive aspect ratio.
pub fn resolve_shape_bounds(bounds: Rect, padding: Insets, aspect_ratio: f32) -> Option<Rect> {
    if bounds.is_empty() || !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
        return None;
    }

    let available_width = bounds.width() - padding.horizontal();
    let available_height = bounds.height() - padding.vertical();
    if available_width <= 0 || available_height <= 0 {
        return None;
    }

    let available_aspect_ratio = available_width as f32 / available_height as f32;

    let mut shape = if available_aspect_ratio > aspect_ratio {
        // height constrained
        Rect::from_size(
            (available_height as f32 * aspect_ratio) as i32,
            available_height,
        )
    } else {
        Rect::from_size(
            available_width,
            (available_width as f32 / aspect_ratio) as i32,
        )
    };

    shape.offset(
        bounds.left + padding.left + (available_width - shape.width()) / 2,
        bounds.top + padding.top + (available_height - shape.height()) / 2,
    );

    Some(shape)
}
