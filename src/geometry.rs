use std::fmt;

use serde::Deserialize;

/// Box in extent form `[x, y, w, h]`, as stored in ground-truth descriptors
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 4]")]
pub struct ExtentBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<[f64; 4]> for ExtentBox {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self { x, y, width, height }
    }
}

impl ExtentBox {
    pub fn to_corner_form(self) -> BoundingBox {
        to_corner_form(self.x, self.y, self.width, self.height)
    }
}

/// Box in corner form `(x1, y1, x2, y2)`.
///
/// Nothing is enforced about ordering; degenerate and inverted boxes are
/// carried as given and only rejected where a pixel region is needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Corners rounded to the nearest pixel
    pub fn pixel_corners(&self) -> (i64, i64, i64, i64) {
        (
            self.x1.round() as i64,
            self.y1.round() as i64,
            self.x2.round() as i64,
            self.y2.round() as i64,
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Convert extent form to corner form without rounding
pub fn to_corner_form(x: f64, y: f64, w: f64, h: f64) -> BoundingBox {
    BoundingBox::new(x, y, x + w, y + h)
}

/// Intersection over union of two corner-form boxes, in `[0, 1]`
pub fn overlap_ratio(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    if x2 <= x1 || y2 <= y1 {
        return 0.0;
    }

    let intersection = (x2 - x1) * (y2 - y1);
    intersection / (a.area() + b.area() - intersection)
}
