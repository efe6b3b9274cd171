//! Percentage space to output space.
//!
//! Fields are placed as percentages of their page, measured from the top-left corner.
//! Both the on-screen preview and the final document need absolute coordinates, and
//! both get them from [transform_field] so that what is shown is exactly what gets
//! burned into the PDF. The function is unit-agnostic: give it a container measured in
//! pixels and you get pixels back, give it a page measured in points and you get points.
//!
//! The output origin is always the bottom-left corner, as in PDF user space.

use crate::pagesize::{self, PageSize};
use crate::rect::{Point, Rect};
use crate::units::Pt;
use serde::{Deserialize, Serialize};

/// A field's box in percentage space: every component is a percentage (nominally 0 to
/// 100) of the container's width or height, with `x` and `y` measured from the
/// container's top-left corner.
///
/// Values outside of `0..=100`, or boxes that extend past the container, are kept as-is
/// and simply land partly or fully outside of the page.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> PercentRect {
        PercentRect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// The extent of a container, in whatever unit the caller works in
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Size {
        Size { width, height }
    }
}

/// Map a percentage-space box into a container of `container` size, flipping the y-axis
/// so the result has a bottom-left origin. No rounding is applied.
pub fn transform_field(field: &PercentRect, container: Size) -> Rect {
    let width = (field.width / 100.0) * container.width;
    let height = (field.height / 100.0) * container.height;
    let x = (field.x / 100.0) * container.width;
    let y = container.height - (field.y / 100.0) * container.height - height;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Map a single percentage-space point; the zero-height case of [transform_field]
pub fn transform_point(x: f64, y: f64, container: Size) -> Point {
    Point {
        x: (x / 100.0) * container.width,
        y: container.height - (y / 100.0) * container.height,
    }
}

/// The geometry of one page of a loaded document: its 1-based number, its MediaBox extent
/// and the MediaBox's lower-left corner, which is not always the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PageGeometry {
    pub number: u32,
    pub width: Pt,
    pub height: Pt,
    pub origin: (Pt, Pt),
}

impl PageGeometry {
    pub fn new(number: u32, (width, height): PageSize) -> PageGeometry {
        PageGeometry {
            number,
            width,
            height,
            origin: (Pt(0.0), Pt(0.0)),
        }
    }

    /// Geometry from a `[llx lly urx ury]` MediaBox. Boxes may be given with any two
    /// opposite corners, so they are normalized first.
    pub fn from_media_box(number: u32, media_box: [f64; 4]) -> PageGeometry {
        let [x1, y1, x2, y2] = media_box;
        PageGeometry {
            number,
            width: Pt((x2 - x1).abs()),
            height: Pt((y2 - y1).abs()),
            origin: (Pt(x1.min(x2)), Pt(y1.min(y2))),
        }
    }

    /// Geometry used when a page carries no usable MediaBox
    pub fn fallback(number: u32) -> PageGeometry {
        PageGeometry::new(number, pagesize::LETTER)
    }

    pub fn size(&self) -> Size {
        Size {
            width: *self.width,
            height: *self.height,
        }
    }

    /// Place a percentage-space box on this page, in absolute user-space points
    pub fn place(&self, field: &PercentRect) -> Rect {
        transform_field(field, self.size()).translate(*self.origin.0, *self.origin.1)
    }
}
