use std::io::{self, Write};

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use super::{Page, Report, TranscriptPage};

const BODY_FONT: &str = "F1";
const TITLE_FONT: &str = "F2";
const IMAGE_NAME: &str = "Im0";

const BODY_SIZE: f32 = 9.0;
const BODY_LEADING: f32 = 10.5;
const TITLE_SIZE: f32 = 12.0;
const FOOTER_SIZE: f32 = 8.0;
/// Advance width of Courier glyphs, in em
const COURIER_ADVANCE: f32 = 0.6;
const MARGIN: f32 = 18.0;

const SUMMARY_SIZE: (f32, f32) = (432.0, 144.0);
const IMAGE_PAGE_SIZE: (f32, f32) = (432.0, 432.0);
const TRANSCRIPT_PAGE_SIZE: (f32, f32) = (576.0, 900.0);
const TITLE_BAND: f32 = 30.0;
const JPEG_QUALITY: u8 = 90;

/// Serialise `report` as a PDF document into `out`.
///
/// Each page's content stream and image are encoded and handed to the
/// document as soon as that page is laid out.
pub fn write_pdf<W: Write>(report: &Report<'_>, out: &mut W) -> io::Result<()> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let body_font = add_font(&mut doc, "Courier");
    let title_font = add_font(&mut doc, "Courier-Bold");

    let mut kids: Vec<Object> = Vec::with_capacity(report.pages().len());
    for page in report.pages() {
        let (size, operations, image) = match page {
            Page::Summary { lines } => summary_page(lines),
            Page::Image { title, image } => {
                let (operations, image_id) = image_page(&mut doc, title, image)?;
                (IMAGE_PAGE_SIZE, operations, Some(image_id))
            }
            Page::Transcript(transcript) => transcript_page(transcript),
        };

        let content = Content { operations }.encode().map_err(|e| io::Error::other(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let mut resources = dictionary! {
            "Font" => dictionary! {
                BODY_FONT => body_font,
                TITLE_FONT => title_font,
            },
        };
        if let Some(image_id) = image {
            resources.set("XObject", dictionary! { IMAGE_NAME => image_id });
        }

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), size.0.into(), size.1.into()],
            "Resources" => resources,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save_to(out).map_err(|e| io::Error::other(e.to_string()))?;
    out.flush()
}

fn add_font(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

fn summary_page(lines: &[String]) -> ((f32, f32), Vec<Operation>, Option<ObjectId>) {
    let (width, min_height) = SUMMARY_SIZE;
    let height = min_height.max(2.0 * MARGIN + lines.len() as f32 * BODY_LEADING);
    let operations = text_block(BODY_FONT, BODY_SIZE, MARGIN, height - MARGIN - BODY_SIZE, lines);
    ((width, height), operations, None)
}

fn image_page(
    doc: &mut Document,
    title: &str,
    image: &RgbImage,
) -> io::Result<(Vec<Operation>, ObjectId)> {
    let image_id = add_image(doc, image)?;
    let (page_w, page_h) = IMAGE_PAGE_SIZE;

    let title_width = title.chars().count() as f32 * TITLE_SIZE * COURIER_ADVANCE;
    let title_x = ((page_w - title_width) / 2.0).max(MARGIN);
    let title_y = page_h - MARGIN - TITLE_SIZE;
    let mut operations = text_block(TITLE_FONT, TITLE_SIZE, title_x, title_y, &[title.to_string()]);

    let avail_w = page_w - 2.0 * MARGIN;
    let avail_h = page_h - 2.0 * MARGIN - TITLE_BAND;
    let (img_w, img_h) = (image.width().max(1) as f32, image.height().max(1) as f32);
    let scale = (avail_w / img_w).min(avail_h / img_h);
    let (draw_w, draw_h) = (img_w * scale, img_h * scale);
    let x = MARGIN + (avail_w - draw_w) / 2.0;
    let y = MARGIN + (avail_h - draw_h) / 2.0;

    operations.extend([
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![draw_w.into(), 0.into(), 0.into(), draw_h.into(), x.into(), y.into()],
        ),
        Operation::new("Do", vec![IMAGE_NAME.into()]),
        Operation::new("Q", vec![]),
    ]);

    Ok((operations, image_id))
}

fn transcript_page(page: &TranscriptPage) -> ((f32, f32), Vec<Operation>, Option<ObjectId>) {
    let (width, height) = TRANSCRIPT_PAGE_SIZE;
    let lines = page.display_lines();
    let mut operations = text_block(BODY_FONT, BODY_SIZE, MARGIN, height - MARGIN - BODY_SIZE, &lines);

    if let Some(footer) = page.footer() {
        let footer_width = footer.chars().count() as f32 * FOOTER_SIZE * COURIER_ADVANCE;
        let x = (width - footer_width) / 2.0;
        operations.extend(text_block(BODY_FONT, FOOTER_SIZE, x, MARGIN / 2.0, &[footer]));
    }

    ((width, height), operations, None)
}

/// Left-aligned lines starting with the first baseline at `(x, y)`
fn text_block(font: &str, size: f32, x: f32, y: f32, lines: &[String]) -> Vec<Operation> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("TL", vec![BODY_LEADING.max(size + 1.5).into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(encode_text(line))]));
    }
    operations.push(Operation::new("ET", vec![]));
    operations
}

/// Map text onto the single-byte font encoding; anything outside Latin-1
/// becomes `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            c if c.is_control() => b' ',
            c => u8::try_from(u32::from(c)).unwrap_or(b'?'),
        })
        .collect()
}

fn add_image(doc: &mut Document, image: &RgbImage) -> io::Result<ObjectId> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode_image(image)
        .map_err(|e| io::Error::other(e.to_string()))?;

    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width()),
            "Height" => i64::from(image.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    );
    stream.allows_compression = false;
    Ok(doc.add_object(stream))
}
