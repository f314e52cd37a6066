use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;

/// 5x7 digit glyphs, one byte per row, bit 4 is the leftmost column
const DIGITS: [[u8; 7]; 10] = [
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
];

const GLYPH_WIDTH: i64 = 5;
const GLYPH_HEIGHT: usize = 7;
const ORIGIN_SLACK: i64 = 1 << 20;

/// Face used to write box indices onto overlays
pub enum LabelFont {
    /// Built-in digit bitmaps, each cell scaled up `scale` times
    Bitmap { scale: u32 },
    /// TrueType font loaded at runtime
    Glyph { font: FontVec, scale: PxScale },
}

impl Default for LabelFont {
    fn default() -> Self {
        LabelFont::Bitmap { scale: 2 }
    }
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelFont::Bitmap { scale } => f.debug_struct("Bitmap").field("scale", scale).finish(),
            LabelFont::Glyph { scale, .. } => f.debug_struct("Glyph").field("scale", &scale.y).finish(),
        }
    }
}

impl LabelFont {
    /// Load a TrueType/OpenType font file
    pub fn from_file(path: &Path, size: f32) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let font = FontVec::try_from_vec(data).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid font {}: {}", path.display(), e),
            )
        })?;
        Ok(LabelFont::Glyph {
            font,
            scale: PxScale::from(size),
        })
    }

    /// Draw `text` with its top-left corner at `(x, y)`; pixels outside the
    /// canvas are clipped.
    pub fn draw(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i64, y: i64, text: &str) {
        let x = clamp_origin(x, canvas.width());
        let y = clamp_origin(y, canvas.height());
        match self {
            LabelFont::Glyph { font, scale } => {
                draw_text_mut(canvas, color, x, y, *scale, font, text);
            }
            LabelFont::Bitmap { scale } => {
                let (x, y) = (i64::from(x), i64::from(y));
                let scale = i64::from((*scale).max(1));
                let mut pen_x = x;
                for ch in text.chars() {
                    if let Some(digit) = ch.to_digit(10) {
                        draw_digit(canvas, color, pen_x, y, digit as usize, scale);
                    }
                    pen_x += (GLYPH_WIDTH + 1) * scale;
                }
            }
        }
    }
}

fn draw_digit(canvas: &mut RgbImage, color: Rgb<u8>, x: i64, y: i64, digit: usize, scale: i64) {
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    if x >= width || y >= height {
        return;
    }

    for (row, bits) in DIGITS[digit].iter().enumerate().take(GLYPH_HEIGHT) {
        for col in 0..GLYPH_WIDTH {
            if bits & (0x10u8 >> col) == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + col * scale + dx;
                    let py = y + row as i64 * scale + dy;
                    if px >= 0 && py >= 0 && px < width && py < height {
                        canvas.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}

/// Pull a text origin back to just past the canvas edge or a fixed distance
/// before it; nothing visible moves and glyph offsets stay within `i32`.
fn clamp_origin(value: i64, extent: u32) -> i32 {
    let upper = (i64::from(extent) + 1).min(i64::from(i32::MAX));
    value.clamp(-ORIGIN_SLACK, upper) as i32
}
