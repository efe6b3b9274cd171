//! 2D transformation matrices for placing image XObjects on a page.

use crate::rect::{Point, Rect};
use pdf_writer::Content;

/// A transformation matrix, as used by the PDF `cm` operator.
///
/// Uses the standard PDF transformation matrix where (0,0) is at the bottom-left.
/// The matrix is represented as [a, b, c, d, e, f] corresponding to:
/// ```text
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
/// ```
///
/// Image XObjects are drawn into the unit square, so placing one is a scale to the target
/// size followed by a translation to the target corner:
///
/// ```
/// use pdf_stamp::{Rect, Transform};
///
/// let target = Rect::new(72.0, 144.0, 200.0, 50.0);
/// let transform = Transform::scale(target.width, target.height)
///     .with_translate(target.x, target.y);
/// assert_eq!(transform, Transform::placing(target));
/// ```
///
/// Components are kept in `f64` while composing and only narrowed when written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity transform (no transformation)
    pub fn identity() -> Self {
        Transform {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Create a translation transform
    pub fn translate(x: f64, y: f64) -> Self {
        Transform {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: x,
            f: y,
        }
    }

    /// Create a scaling transform
    pub fn scale(sx: f64, sy: f64) -> Self {
        Transform {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: 0.0,
            f: 0.0,
        }
    }

    /// The transform mapping the unit square onto `target`
    pub fn placing(target: Rect) -> Self {
        Transform::scale(target.width, target.height).with_translate(target.x, target.y)
    }

    /// Combine this transform with another (self * other)
    pub fn then(self, other: Transform) -> Self {
        Transform {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Add a translation to this transform
    pub fn with_translate(self, x: f64, y: f64) -> Self {
        self.then(Transform::translate(x, y))
    }

    /// Where `point` ends up under this transform
    pub fn apply(&self, point: Point) -> Point {
        Point {
            x: self.a * point.x + self.c * point.y + self.e,
            y: self.b * point.x + self.d * point.y + self.f,
        }
    }

    /// Write the transform to a PDF content stream
    pub fn write_to_content(&self, content: &mut Content) {
        content.transform([
            self.a as f32,
            self.b as f32,
            self.c as f32,
            self.d as f32,
            self.e as f32,
            self.f as f32,
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placing_maps_the_unit_square_onto_the_target() {
        let target = Rect::new(10.0, 20.0, 100.0, 50.0);
        let t = Transform::placing(target);
        assert_eq!(t.apply(Point::new(0.0, 0.0)), Point::new(10.0, 20.0));
        assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(110.0, 70.0));
    }

    #[test]
    fn composition_applies_left_to_right() {
        let t = Transform::translate(5.0, 5.0).then(Transform::scale(2.0, 3.0));
        assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(12.0, 18.0));
        assert_eq!(Transform::default().then(t), t);
    }

    #[test]
    fn writes_a_cm_operator() {
        let mut content = Content::new();
        Transform::placing(Rect::new(1.5, 2.0, 3.0, 4.0)).write_to_content(&mut content);
        let written = String::from_utf8(content.finish()).unwrap();
        assert_eq!(written.trim(), "3 0 0 4 1.5 2 cm");
    }
}
