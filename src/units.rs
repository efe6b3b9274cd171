use derive_more::{Add, AddAssign, Deref, Div, From, Into, Mul, MulAssign, Sub};

/// A length in PDF points, 1/72 of an inch. Page geometry, font sizes and line widths in
/// the generated content are all expressed in points.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Sub,
    Mul,
    MulAssign,
    Div,
    Deref,
    From,
    Into,
)]
pub struct Pt(pub f64);

impl Pt {
    /// The value as written into a content stream
    pub fn to_f32(self) -> f32 {
        self.0 as f32
    }
}
