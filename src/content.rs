//! Encoding of page plans into PDF content streams.

use crate::config::RenderOptions;
use crate::font::HELVETICA;
use crate::page::{DrawOp, PagePlan};
use crate::rect::{Point, Rect};
use crate::transform::Transform;
use pdf_writer::{Content, Name, Str};

/// Control point distance for approximating a quarter ellipse with a cubic Bézier
const KAPPA: f64 = 0.552_284_749_8;

/// Renders a page plan to a content stream.
///
/// `font` is the resource name the text font was registered under, and `images` the
/// resource names of the plan's images, in the same order as `plan.images`. Every op is
/// wrapped in its own `q`/`Q` pair so no state leaks from one field to the next.
pub(crate) fn render_plan(
    plan: &PagePlan,
    font: Option<&str>,
    images: &[String],
    options: &RenderOptions,
) -> Vec<u8> {
    let mut content = Content::new();

    for op in plan.ops.iter() {
        content.save_state();
        match op {
            DrawOp::Image { image, placement } => {
                // a plan never references an image it doesn't carry
                if let Some(name) = images.get(*image) {
                    Transform::placing(*placement).write_to_content(&mut content);
                    content.x_object(Name(name.as_bytes()));
                }
            }
            DrawOp::Text {
                text,
                origin,
                size,
                clip,
            } => {
                if let Some(font) = font {
                    if let Some(clip) = clip {
                        rect(&mut content, clip);
                        content.clip_nonzero();
                        content.end_path();
                    }
                    options.ink.set_fill(&mut content);
                    content.begin_text();
                    content.set_font(Name(font.as_bytes()), size.to_f32());
                    content.next_line(origin.x as f32, origin.y as f32);
                    content.show(Str(&HELVETICA.encode(text)));
                    content.end_text();
                }
            }
            DrawOp::Outline { rect: r, line_width } => {
                options.ink.set_stroke(&mut content);
                content.set_line_width(line_width.to_f32());
                rect(&mut content, r);
                content.stroke();
            }
            DrawOp::Dot { bounds } => {
                ellipse(&mut content, bounds);
                options.ink.set_fill(&mut content);
                content.fill_nonzero();
            }
            DrawOp::Polyline { points, line_width } => {
                if let Some((first, rest)) = points.split_first() {
                    options.ink.set_stroke(&mut content);
                    content.set_line_width(line_width.to_f32());
                    move_to(&mut content, *first);
                    for p in rest {
                        content.line_to(p.x as f32, p.y as f32);
                    }
                    content.stroke();
                }
            }
        }
        content.restore_state();
    }

    content.finish()
}

fn rect(content: &mut Content, r: &Rect) {
    content.rect(r.x as f32, r.y as f32, r.width as f32, r.height as f32);
}

fn move_to(content: &mut Content, p: Point) {
    content.move_to(p.x as f32, p.y as f32);
}

/// Four Bézier quarters, counter-clockwise from the rightmost point
fn ellipse(content: &mut Content, bounds: &Rect) {
    let c = bounds.center();
    let rx = bounds.width / 2.0;
    let ry = bounds.height / 2.0;
    let kx = rx * KAPPA;
    let ky = ry * KAPPA;

    let f = |v: f64| v as f32;

    content.move_to(f(c.x + rx), f(c.y));
    let mut curve = |x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64| {
        content.cubic_to(f(x1), f(y1), f(x2), f(y2), f(x3), f(y3));
    };

    curve(c.x + rx, c.y + ky, c.x + kx, c.y + ry, c.x, c.y + ry);
    curve(c.x - kx, c.y + ry, c.x - rx, c.y + ky, c.x - rx, c.y);
    curve(c.x - rx, c.y - ky, c.x - kx, c.y - ry, c.x, c.y - ry);
    curve(c.x + kx, c.y - ry, c.x + rx, c.y - ky, c.x + rx, c.y);
    content.close_path();
}
