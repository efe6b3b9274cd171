//! Per-page render plans.
//!
//! Fields are turned into [DrawOp]s here, in absolute page coordinates, before anything
//! is written to the document. Fields that can't be drawn are left out of the plan and
//! recorded in the [RenderReport] instead.

use crate::config::RenderOptions;
use crate::error::FieldError;
use crate::field::{Field, FieldId, FieldKind, FieldType};
use crate::fit::aspect_fit;
use crate::geometry::PageGeometry;
use crate::image::Image;
use crate::rect::{Point, Rect};
use crate::units::Pt;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Where the checkmark's polyline runs, as fractions of the checkbox from its
/// lower-left corner
const CHECKMARK: [(f64, f64); 3] = [(0.2, 0.5), (0.45, 0.2), (0.8, 0.8)];

/// A drawing primitive, positioned in page user space
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Draw the plan's `image`th image into `placement`
    Image { image: usize, placement: Rect },
    /// A single line of text starting at the baseline point `origin`
    Text {
        text: String,
        origin: Point,
        size: Pt,
        clip: Option<Rect>,
    },
    /// A stroked rectangle
    Outline { rect: Rect, line_width: Pt },
    /// The filled ellipse inscribed in `bounds`
    Dot { bounds: Rect },
    /// An open stroked path through `points`
    Polyline { points: Vec<Point>, line_width: Pt },
}

impl DrawOp {
    pub fn is_text(&self) -> bool {
        matches!(self, DrawOp::Text { .. })
    }
}

/// Everything to be drawn on one page
pub struct PagePlan {
    pub page: PageGeometry,
    pub ops: Vec<DrawOp>,
    /// Decoded images, referenced from [DrawOp::Image] by index
    pub images: Vec<Image>,
}

impl PagePlan {
    pub fn new(page: PageGeometry) -> PagePlan {
        PagePlan {
            page,
            ops: Vec::default(),
            images: Vec::default(),
        }
    }

    /// Whether the plan needs a font resource
    pub fn uses_text(&self) -> bool {
        self.ops.iter().any(DrawOp::is_text)
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// A field that was left out of the output, and why
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedField {
    pub id: FieldId,
    pub field_type: FieldType,
    #[serde(serialize_with = "as_display")]
    pub reason: FieldError,
}

/// What happened to each field during a render
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    /// Number of pages that received an overlay
    pub pages_stamped: usize,
    /// Number of fields that produced output
    pub fields_drawn: usize,
    /// Fields that could not be drawn
    pub skipped: Vec<SkippedField>,
    /// Fields that had nothing to draw: signature and image fields without an image,
    /// text and date fields with empty text
    pub empty: Vec<FieldId>,
}

impl RenderReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, field: &Field, reason: FieldError) {
        log::warn!(
            "skipping {} field {} on page {}: {reason}",
            field.field_type(),
            field.id,
            field.page
        );
        self.skipped.push(SkippedField {
            id: field.id,
            field_type: field.field_type(),
            reason,
        });
    }
}

fn as_display<S: Serializer>(reason: &FieldError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

/// Group fields by page number, keeping their relative order. Pages come out ascending.
pub fn group_by_page(fields: &[Field]) -> BTreeMap<u32, Vec<&Field>> {
    let mut pages: BTreeMap<u32, Vec<&Field>> = BTreeMap::new();
    for field in fields {
        pages.entry(field.page).or_default().push(field);
    }
    pages
}

/// Plan the drawing for every page that has fields. Plans are returned in ascending page
/// order; pages without anything to draw get no plan.
pub fn plan_pages(
    fields: &[Field],
    pages: &[PageGeometry],
    options: &RenderOptions,
) -> (Vec<PagePlan>, RenderReport) {
    let mut report = RenderReport::default();
    let mut plans = Vec::new();

    for (number, page_fields) in group_by_page(fields) {
        let geometry = number
            .checked_sub(1)
            .and_then(|i| pages.get(i as usize));
        let Some(geometry) = geometry else {
            for field in page_fields {
                report.skip(
                    field,
                    FieldError::PageOutOfRange {
                        page: number,
                        page_count: pages.len(),
                    },
                );
            }
            continue;
        };

        let mut plan = PagePlan::new(*geometry);
        for field in page_fields {
            let before = plan.ops.len();
            match plan_field(&mut plan, field, options) {
                Ok(()) if plan.ops.len() > before => report.fields_drawn += 1,
                Ok(()) => report.empty.push(field.id),
                Err(e) => report.skip(field, e),
            }
        }

        log::debug!(
            "page {}: {} draw ops, {} images",
            number,
            plan.ops.len(),
            plan.images.len()
        );
        if !plan.is_empty() {
            plans.push(plan);
        }
    }

    report.pages_stamped = plans.len();
    (plans, report)
}

/// Append the ops for one field. Nothing is appended when the field fails.
fn plan_field(
    plan: &mut PagePlan,
    field: &Field,
    options: &RenderOptions,
) -> Result<(), FieldError> {
    let bbox = plan.page.place(&field.rect);

    match &field.kind {
        FieldKind::Signature { image_data } | FieldKind::Image { image_data } => {
            let Some(data) = image_data else {
                return Ok(());
            };
            let image = Image::decode(data)?;
            let fit = aspect_fit(
                bbox.width,
                bbox.height,
                image.width as f64,
                image.height as f64,
            )?;
            plan.images.push(image);
            plan.ops.push(DrawOp::Image {
                image: plan.images.len() - 1,
                placement: fit.place_in(bbox),
            });
        }
        FieldKind::Text { text } => {
            if !text.is_empty() {
                // only the width is constrained; the strip spans the whole page height
                let clip = Rect::new(
                    bbox.x,
                    *plan.page.origin.1,
                    bbox.width,
                    *plan.page.height,
                );
                plan.ops.push(text_op(text, bbox, Some(clip), options));
            }
        }
        FieldKind::Date { date } => {
            if !date.is_empty() {
                plan.ops.push(text_op(date, bbox, None, options));
            }
        }
        FieldKind::Checkbox { checked } => {
            plan.ops.push(DrawOp::Outline {
                rect: bbox,
                line_width: options.border_width,
            });
            if *checked {
                plan.ops.push(DrawOp::Polyline {
                    points: CHECKMARK
                        .iter()
                        .map(|&(fx, fy)| bbox.at_fraction(fx, fy))
                        .collect(),
                    line_width: options.check_width,
                });
            }
        }
        FieldKind::Radio { checked } => {
            plan.ops.push(DrawOp::Outline {
                rect: bbox,
                line_width: options.border_width,
            });
            if *checked {
                let (width, height) = (bbox.width * 2.0 / 3.0, bbox.height * 2.0 / 3.0);
                plan.ops.push(DrawOp::Dot {
                    bounds: Rect::centered(bbox.center(), width, height),
                });
            }
        }
    }

    Ok(())
}

fn text_op(text: &str, bbox: Rect, clip: Option<Rect>, options: &RenderOptions) -> DrawOp {
    DrawOp::Text {
        text: text.to_string(),
        origin: Point::new(
            bbox.x + *options.text_inset,
            bbox.top() - *options.text_drop,
        ),
        size: options.font_size,
        clip,
    }
}
