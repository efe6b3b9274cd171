use serde::Serialize;

/// A point in an output coordinate space
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

/// An axis-aligned box, specified by one corner and its extent. In point space the
/// corner is the lower-left one; in viewport (preview) space it is the upper-left one.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// The x-coordinate of the edge opposite to `x`
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// The y-coordinate of the edge opposite to `y`
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        self.at_fraction(0.5, 0.5)
    }

    /// The point at `(fx, fy)` of the box's width and height, measured from its corner.
    /// `(0.0, 0.0)` is the corner itself and `(1.0, 1.0)` the opposite one.
    pub fn at_fraction(&self, fx: f64, fy: f64) -> Point {
        Point {
            x: self.x + self.width * fx,
            y: self.y + self.height * fy,
        }
    }

    pub fn translate(self, dx: f64, dy: f64) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// A box with the same center and the given extent
    pub fn centered(center: Point, width: f64, height: f64) -> Rect {
        Rect {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }
}
