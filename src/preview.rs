//! On-screen placement of fields.
//!
//! The preview shows each page scaled into a viewport measured in pixels, with the origin
//! at the top-left as on screen. Boxes come from the same [transform_field] as the
//! final render, so a field appears exactly where it will be burned in.

use crate::geometry::{transform_field, PercentRect, Size};
use crate::rect::{Point, Rect};
use serde::{Deserialize, Serialize};

/// The pixel size of the rendered page in the preview
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Viewport {
        Viewport { width, height }
    }

    /// Whether the page has been laid out yet. Nothing can be placed in a viewport
    /// without an area.
    pub fn is_measured(&self) -> bool {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        valid(self.width) && valid(self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Where to draw a field in the viewport, in pixels from the top-left corner
pub fn field_box(field: &PercentRect, viewport: Viewport) -> Option<Rect> {
    if !viewport.is_measured() {
        return None;
    }
    let out = transform_field(field, viewport.size());
    // flip back to a top-left origin
    Some(Rect::new(
        out.x,
        viewport.height - out.y - out.height,
        out.width,
        out.height,
    ))
}

/// Convert a dragged box's top-left pixel position into percentages
pub fn drag_to_percent(position: Point, viewport: Viewport) -> Option<(f64, f64)> {
    if !viewport.is_measured() {
        return None;
    }
    Some((
        position.x / viewport.width * 100.0,
        position.y / viewport.height * 100.0,
    ))
}

/// Convert a resized box, in top-left pixels, into a percentage-space box
pub fn resize_to_percent(pixels: Rect, viewport: Viewport) -> Option<PercentRect> {
    let (x, y) = drag_to_percent(Point::new(pixels.x, pixels.y), viewport)?;
    Some(PercentRect::new(
        x,
        y,
        pixels.width / viewport.width * 100.0,
        pixels.height / viewport.height * 100.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn preview_matches_the_percentages() {
        let b = field_box(&PercentRect::new(10.0, 20.0, 30.0, 5.0), Viewport::default()).unwrap();
        assert!(close(b.x, 80.0));
        assert!(close(b.y, 120.0));
        assert!(close(b.width, 240.0));
        assert!(close(b.height, 30.0));
    }

    #[test]
    fn preview_is_the_final_transform_flipped() {
        let field = PercentRect::new(33.0, 71.5, 12.0, 9.0);
        let viewport = Viewport::new(1024.0, 1325.0);
        let preview = field_box(&field, viewport).unwrap();
        let burned = transform_field(&field, viewport.size());
        assert!(close(preview.x, burned.x));
        assert!(close(preview.width, burned.width));
        assert!(close(preview.y + preview.height, viewport.height - burned.y));
    }

    #[test]
    fn unmeasured_viewport_places_nothing() {
        let field = PercentRect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(field_box(&field, Viewport::new(0.0, 600.0)), None);
        assert_eq!(drag_to_percent(Point::new(1.0, 1.0), Viewport::new(800.0, 0.0)), None);
    }

    #[test]
    fn drag_and_resize_round_trip() {
        let viewport = Viewport::new(817.0, 1057.0);
        let field = PercentRect::new(12.3, 45.6, 25.0, 10.0);
        let pixels = field_box(&field, viewport).unwrap();

        let (x, y) = drag_to_percent(Point::new(pixels.x, pixels.y), viewport).unwrap();
        assert!(close(x, field.x));
        assert!(close(y, field.y));

        let back = resize_to_percent(pixels, viewport).unwrap();
        assert!(close(back.width, field.width));
        assert!(close(back.height, field.height));
    }
}
