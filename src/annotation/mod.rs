pub mod label;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::error::{ReportError, Result};
use crate::geometry::BoundingBox;

pub use label::LabelFont;

/// Outline colour and thickness for one family of boxes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationStyle {
    pub color: Rgb<u8>,
    pub stroke_width: u32,
}

impl AnnotationStyle {
    pub const GROUND_TRUTH: AnnotationStyle = AnnotationStyle {
        color: Rgb([0, 255, 0]),
        stroke_width: 3,
    };

    pub const PROPOSED: AnnotationStyle = AnnotationStyle {
        color: Rgb([255, 0, 0]),
        stroke_width: 3,
    };
}

/// Draws numbered box overlays onto copies of a base image
#[derive(Debug, Default)]
pub struct Annotator {
    label_font: LabelFont,
}

impl Annotator {
    pub fn new(label_font: LabelFont) -> Self {
        Self { label_font }
    }

    /// Return a copy of `image` with every box outlined and labelled with its
    /// 1-based position. The input is left untouched.
    pub fn annotate(&self, image: &RgbImage, boxes: &[BoundingBox], style: AnnotationStyle) -> RgbImage {
        let mut canvas = image.clone();

        for (i, bbox) in boxes.iter().enumerate() {
            draw_outline(&mut canvas, bbox, style);
            let (x1, y1, _, _) = bbox.pixel_corners();
            self.label_font
                .draw(&mut canvas, style.color, x1, y1, &(i + 1).to_string());
        }

        canvas
    }
}

/// Outline drawn inward from the box edges, both corners inclusive.
///
/// Corners are clamped to one stroke width beyond the canvas, which leaves
/// the visible pixels unchanged and keeps the arithmetic bounded.
fn draw_outline(canvas: &mut RgbImage, bbox: &BoundingBox, style: AnnotationStyle) {
    let stroke = i64::from(style.stroke_width);
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let clamp_x = |v: i64| v.clamp(-stroke, width + stroke);
    let clamp_y = |v: i64| v.clamp(-stroke, height + stroke);

    let (ax, ay, bx, by) = bbox.pixel_corners();
    let (left, right) = (clamp_x(ax.min(bx)), clamp_x(ax.max(bx)));
    let (top, bottom) = (clamp_y(ay.min(by)), clamp_y(ay.max(by)));

    for t in 0..stroke {
        let w = right - left + 1 - 2 * t;
        let h = bottom - top + 1 - 2 * t;
        if w <= 0 || h <= 0 {
            break;
        }
        let (Ok(x), Ok(y), Ok(w), Ok(h)) = (
            i32::try_from(left + t),
            i32::try_from(top + t),
            u32::try_from(w),
            u32::try_from(h),
        ) else {
            break;
        };
        draw_hollow_rect_mut(canvas, Rect::at(x, y).of_size(w, h), style.color);
    }
}

/// Cut each box out of `image`, in input order.
///
/// A box must describe a non-empty region inside the image; anything else is
/// an extraction error for the whole set.
pub fn crop(image: &RgbImage, boxes: &[BoundingBox]) -> Result<Vec<RgbImage>> {
    let (width, height) = image.dimensions();

    boxes
        .iter()
        .enumerate()
        .map(|(index, bbox)| {
            let (x1, y1, x2, y2) = bbox.pixel_corners();
            let in_bounds = x1 >= 0
                && y1 >= 0
                && x2 <= i64::from(width)
                && y2 <= i64::from(height)
                && x2 > x1
                && y2 > y1;
            if !in_bounds {
                return Err(ReportError::Extraction {
                    index: index + 1,
                    bbox: *bbox,
                    width,
                    height,
                });
            }

            let region = image::imageops::crop_imm(
                image,
                x1 as u32,
                y1 as u32,
                (x2 - x1) as u32,
                (y2 - y1) as u32,
            );
            Ok(region.to_image())
        })
        .collect()
}
