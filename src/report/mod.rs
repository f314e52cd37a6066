pub mod layout;
pub mod pdf;

use std::io::Write;

use image::RgbImage;

use crate::models::{Outcome, Turn};

pub use layout::{TRANSCRIPT_HEADER, TranscriptLayout};

/// Column width used when wrapping summary fields
pub const SUMMARY_COLUMNS: usize = 76;

/// Sample metadata shown on the summary page
#[derive(Debug, Clone, Copy)]
pub struct SampleSummary<'a> {
    pub image_name: &'a str,
    pub question: &'a str,
    pub answer: &'a str,
    pub pred_ans: &'a str,
    pub outcome: Outcome,
}

impl SampleSummary<'_> {
    pub fn text(&self) -> String {
        format!(
            "Image: {}\nQuestion: {}\nGT Answer: {}\nPredicted: {}\n{}",
            self.image_name,
            self.question,
            self.answer,
            self.pred_ans,
            self.outcome.label()
        )
    }
}

/// Everything a report is built from; images are borrowed from the caller
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    pub summary: SampleSummary<'a>,
    pub original: &'a RgbImage,
    pub gt_overlay: &'a RgbImage,
    pub gt_crops: &'a [RgbImage],
    pub proposed_overlay: &'a RgbImage,
    pub proposed_crops: &'a [RgbImage],
    pub transcript: &'a [Turn],
}

/// One slice of the wrapped transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptPage {
    /// 0-based position among transcript pages
    pub index: usize,
    pub total: usize,
    pub lines: Vec<String>,
}

impl TranscriptPage {
    pub fn header(&self) -> Option<&'static str> {
        (self.index == 0).then_some(TRANSCRIPT_HEADER)
    }

    pub fn footer(&self) -> Option<String> {
        (self.total > 1).then(|| format!("Page {}/{}", self.index + 1, self.total))
    }

    /// Lines as printed: header and its blank separator, then the body
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.lines.len() + 2);
        if let Some(header) = self.header() {
            lines.push(header.to_string());
            lines.push(String::new());
        }
        lines.extend(self.lines.iter().cloned());
        lines
    }
}

#[derive(Debug, Clone)]
pub enum Page<'a> {
    Summary { lines: Vec<String> },
    Image { title: String, image: &'a RgbImage },
    Transcript(TranscriptPage),
}

impl Page<'_> {
    pub fn title(&self) -> Option<&str> {
        match self {
            Page::Image { title, .. } => Some(title.as_str()),
            _ => None,
        }
    }
}

/// Ordered pages of one sample's document
#[derive(Debug, Clone)]
pub struct Report<'a> {
    pages: Vec<Page<'a>>,
}

impl<'a> Report<'a> {
    pub fn pages(&self) -> &[Page<'a>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn transcript_pages(&self) -> impl Iterator<Item = &TranscriptPage> {
        self.pages.iter().filter_map(|page| match page {
            Page::Transcript(transcript) => Some(transcript),
            _ => None,
        })
    }

    /// Encode the document into `out` as PDF
    pub fn write_pdf<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        pdf::write_pdf(self, out)
    }
}

/// Builds the page sequence for a sample
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAssembler {
    pub layout: TranscriptLayout,
}

impl ReportAssembler {
    pub fn new(layout: TranscriptLayout) -> Self {
        Self { layout }
    }

    /// Summary page, then image pages, then transcript pages
    pub fn assemble<'a>(&self, inputs: &ReportInputs<'a>) -> Report<'a> {
        let mut pages = vec![Page::Summary {
            lines: layout::wrap_block(&inputs.summary.text(), SUMMARY_COLUMNS),
        }];

        let mut push_image = |title: String, image: &'a RgbImage| pages.push(Page::Image { title, image });
        push_image("Original Image".to_string(), inputs.original);
        push_image("Original with GT Boxes".to_string(), inputs.gt_overlay);
        for (i, crop) in inputs.gt_crops.iter().enumerate() {
            push_image(format!("gt Crop {}", i + 1), crop);
        }
        push_image("Original with Zoom-In Boxes".to_string(), inputs.proposed_overlay);
        for (i, crop) in inputs.proposed_crops.iter().enumerate() {
            push_image(format!("Zoom-In Crop {}", i + 1), crop);
        }

        pages.extend(self.transcript_pages(inputs.transcript).into_iter().map(Page::Transcript));

        Report { pages }
    }

    /// Wrap the whole transcript once and slice it into pages
    pub fn transcript_pages(&self, transcript: &[Turn]) -> Vec<TranscriptPage> {
        let stream = layout::transcript_stream(transcript);
        let lines = layout::wrap_lines(&stream, self.layout.columns);
        let chunks = layout::paginate(&lines, self.layout.lines_per_page);
        let total = chunks.len();

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, lines)| TranscriptPage { index, total, lines })
            .collect()
    }
}
