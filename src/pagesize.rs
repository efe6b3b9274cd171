//! Paper formats, in portrait orientation (width, height).
//!
//! [LETTER] is the size assumed for pages that carry no usable MediaBox.

use crate::units::*;

/// Page dimensions as (width, height) in points.
pub type PageSize = (Pt, Pt);

/// US Letter, 8.5 by 11 inches
pub const LETTER: PageSize = (Pt(8.5 * 72.0), Pt(11.0 * 72.0));
