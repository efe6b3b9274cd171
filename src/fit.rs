use crate::error::FieldError;
use crate::rect::Rect;

/// The result of fitting an image inside a box: the scaled image extent and where it
/// sits relative to the box's corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AspectFit {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl AspectFit {
    /// Where the fitted image lands when the box is `bbox`
    pub fn place_in(&self, bbox: Rect) -> Rect {
        Rect {
            x: bbox.x + self.offset_x,
            y: bbox.y + self.offset_y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Scale an image of `image_width`×`image_height` uniformly so that it fits entirely
/// inside a `box_width`×`box_height` box, centered along whichever axis has room left.
///
/// Every dimension must be positive and finite, otherwise [FieldError::InvalidGeometry]
/// is returned.
pub fn aspect_fit(
    box_width: f64,
    box_height: f64,
    image_width: f64,
    image_height: f64,
) -> Result<AspectFit, FieldError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !(valid(box_width) && valid(box_height) && valid(image_width) && valid(image_height)) {
        return Err(FieldError::InvalidGeometry {
            box_width,
            box_height,
            image_width,
            image_height,
        });
    }

    let box_aspect = box_width / box_height;
    let image_aspect = image_width / image_height;

    if image_aspect > box_aspect {
        // relatively wider than the box: fill the width
        let height = box_width / image_aspect;
        Ok(AspectFit {
            width: box_width,
            height,
            offset_x: 0.0,
            offset_y: (box_height - height) / 2.0,
        })
    } else {
        let width = box_height * image_aspect;
        Ok(AspectFit {
            width,
            height: box_height,
            offset_x: (box_width - width) / 2.0,
            offset_y: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_into_wide_box_centers_horizontally() {
        let fit = aspect_fit(200.0, 100.0, 100.0, 100.0).unwrap();
        assert_eq!(
            fit,
            AspectFit {
                width: 100.0,
                height: 100.0,
                offset_x: 50.0,
                offset_y: 0.0
            }
        );
    }

    #[test]
    fn square_into_tall_box_centers_vertically() {
        let fit = aspect_fit(100.0, 200.0, 100.0, 100.0).unwrap();
        assert_eq!(
            fit,
            AspectFit {
                width: 100.0,
                height: 100.0,
                offset_x: 0.0,
                offset_y: 50.0
            }
        );
    }

    #[test]
    fn wide_signature_scales_down_to_box_width() {
        let fit = aspect_fit(153.0, 79.2, 600.0, 200.0).unwrap();
        assert_eq!(fit.width, 153.0);
        assert_eq!(fit.height, 51.0);
        assert_eq!(fit.offset_x, 0.0);
        assert!((fit.offset_y - 14.1).abs() < 1e-9);
    }

    #[test]
    fn equal_aspect_fills_the_box() {
        let fit = aspect_fit(50.0, 25.0, 400.0, 200.0).unwrap();
        assert_eq!((fit.width, fit.height), (50.0, 25.0));
        assert_eq!((fit.offset_x, fit.offset_y), (0.0, 0.0));
    }

    #[test]
    fn degenerate_dimensions_are_rejected() {
        assert!(matches!(
            aspect_fit(100.0, 0.0, 10.0, 10.0),
            Err(FieldError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            aspect_fit(100.0, 100.0, 10.0, 0.0),
            Err(FieldError::InvalidGeometry { .. })
        ));
        assert!(aspect_fit(-5.0, 100.0, 10.0, 10.0).is_err());
        assert!(aspect_fit(f64::NAN, 100.0, 10.0, 10.0).is_err());
    }

    #[test]
    fn placement_adds_offsets_to_the_box_corner() {
        let fit = aspect_fit(200.0, 100.0, 100.0, 100.0).unwrap();
        let placed = fit.place_in(Rect::new(10.0, 20.0, 200.0, 100.0));
        assert_eq!(placed, Rect::new(60.0, 20.0, 100.0, 100.0));
    }
}
