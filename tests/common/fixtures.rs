use std::path::Path;
use std::sync::{Arc, Mutex};

use groundcheck::{EvalRecord, Turn};
use image::{ImageBuffer, Rgb, RgbImage};

/// Creates a w x h RGB gradient. The blue channel is fixed at 128 so no
/// pixel ever matches a pure overlay colour.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128u8])
    })
}

/// Writes `<name>` as a PNG and `<stem>.json` with the given extent-form
/// boxes into `dir`.
pub fn write_sample_files(dir: &Path, image_name: &str, size: (u32, u32), bbox: &[[f64; 4]]) {
    let image_path = dir.join(image_name);
    gradient_image(size.0, size.1)
        .save_with_format(&image_path, image::ImageFormat::Png)
        .expect("Failed to save test image");

    let descriptor = serde_json::json!({ "bbox": bbox });
    std::fs::write(image_path.with_extension("json"), descriptor.to_string())
        .expect("Failed to write ground-truth descriptor");
}

/// Creates an evaluation record for `image_name`
pub fn make_record(image_name: &str, acc: bool, transcript: Vec<Turn>) -> EvalRecord {
    EvalRecord {
        image: image_name.to_string(),
        question: "What is the colour of the umbrella?".to_string(),
        answer: "red".to_string(),
        pred_ans: if acc { "red" } else { "blue" }.to_string(),
        acc,
        pred_output: transcript,
    }
}

/// Number of pages in a PDF on disk
pub fn pdf_page_count(path: &Path) -> usize {
    lopdf::Document::load(path)
        .expect("Failed to parse generated PDF")
        .get_pages()
        .len()
}

/// Overlay colours
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

/// Log output captured from a closure run under a plain-text subscriber
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = LogBuffer(Arc::clone(&buffer));
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.lock().expect("log buffer poisoned").clone();
    (result, String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Clone)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
