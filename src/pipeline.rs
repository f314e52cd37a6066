use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{ImageReader, RgbImage};
use tracing::{debug, error, warn};

use crate::annotation::{self, AnnotationStyle, Annotator};
use crate::error::{ReportError, ResourceKind, Result};
use crate::extraction::extract_proposed_boxes;
use crate::geometry::BoundingBox;
use crate::models::{EvalRecord, GroundTruth, Outcome, Sample};
use crate::report::{ReportAssembler, ReportInputs, SampleSummary, layout};

/// Wrap width of the plain-text transcript dump
const TEXT_DUMP_COLUMNS: usize = 175;

/// Resolved input locations for one sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSource {
    pub image_path: PathBuf,
    pub descriptor_path: PathBuf,
}

impl SampleSource {
    /// Image under `root`, with its descriptor next to it as `<stem>.json`
    pub fn in_dir(root: &Path, image_name: &str) -> Self {
        let image_path = root.join(image_name);
        let descriptor_path = image_path.with_extension("json");
        Self {
            image_path,
            descriptor_path,
        }
    }
}

/// What gets written per sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// `<partition>/<stem>.pdf` only
    #[default]
    DocumentOnly,
    /// `<partition>/<stem>/summary.pdf` plus overlays, crops and a text dump
    WithAssets,
}

/// Lifecycle of a sample inside the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleState {
    Pending,
    Loaded,
    Annotated,
    Assembled,
    Written,
    Skipped,
    Failed,
}

/// Terminal result of processing one sample
#[derive(Debug)]
pub enum SampleOutcome {
    Written { path: PathBuf, outcome: Outcome },
    Skipped(ReportError),
    Failed(ReportError),
}

impl SampleOutcome {
    pub fn state(&self) -> SampleState {
        match self {
            SampleOutcome::Written { .. } => SampleState::Written,
            SampleOutcome::Skipped(_) => SampleState::Skipped,
            SampleOutcome::Failed(_) => SampleState::Failed,
        }
    }
}

/// A loaded sample with its overlays and crops rendered
pub struct AnnotatedSample {
    pub sample: Sample,
    pub original: RgbImage,
    pub gt_boxes: Vec<BoundingBox>,
    pub gt_overlay: RgbImage,
    pub gt_crops: Vec<RgbImage>,
    pub proposed_boxes: Vec<BoundingBox>,
    pub proposed_overlay: RgbImage,
    pub proposed_crops: Vec<RgbImage>,
}

impl AnnotatedSample {
    fn report_inputs(&self) -> ReportInputs<'_> {
        ReportInputs {
            summary: SampleSummary {
                image_name: &self.sample.image_name,
                question: &self.sample.question,
                answer: &self.sample.answer,
                pred_ans: &self.sample.pred_ans,
                outcome: self.sample.outcome(),
            },
            original: &self.original,
            gt_overlay: &self.gt_overlay,
            gt_crops: &self.gt_crops,
            proposed_overlay: &self.proposed_overlay,
            proposed_crops: &self.proposed_crops,
            transcript: &self.sample.transcript,
        }
    }
}

/// Takes one sample from its inputs to a written report
#[derive(Debug)]
pub struct SampleProcessor {
    report_root: PathBuf,
    output_mode: OutputMode,
    annotator: Annotator,
    assembler: ReportAssembler,
}

impl SampleProcessor {
    pub fn new(report_root: impl Into<PathBuf>) -> Self {
        Self {
            report_root: report_root.into(),
            output_mode: OutputMode::default(),
            annotator: Annotator::default(),
            assembler: ReportAssembler::default(),
        }
    }

    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn with_assembler(mut self, assembler: ReportAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Process one sample to a terminal state. Never returns an error: missing
    /// inputs become `Skipped`, anything else that goes wrong `Failed`.
    pub fn process(&self, record: EvalRecord, source: &SampleSource) -> SampleOutcome {
        let name = record.image.clone();

        match self.run(record, source) {
            Ok((path, outcome)) => {
                debug!(sample = %name, path = %path.display(), "report written");
                SampleOutcome::Written { path, outcome }
            }
            Err(err) if err.is_skip() => {
                warn!(sample = %name, reason = %err, "skipping sample");
                SampleOutcome::Skipped(err)
            }
            Err(err) => {
                error!(sample = %name, error = %err, "failed to process sample");
                SampleOutcome::Failed(err)
            }
        }
    }

    fn run(&self, record: EvalRecord, source: &SampleSource) -> Result<(PathBuf, Outcome)> {
        let name = record.image.clone();
        let transition = |state: SampleState| debug!(sample = %name, ?state, "sample state");

        let sample = self.load(record, source)?;
        transition(SampleState::Loaded);

        let annotated = self.annotate(sample)?;
        transition(SampleState::Annotated);

        let outcome = annotated.sample.outcome();
        let path = self.write(&annotated)?;
        transition(SampleState::Written);

        Ok((path, outcome))
    }

    /// Pending → Loaded: both inputs must exist before anything is decoded
    pub fn load(&self, record: EvalRecord, source: &SampleSource) -> Result<Sample> {
        let missing = |kind, path: &Path| ReportError::ResourceMissing {
            sample: record.image.clone(),
            kind,
            path: path.to_path_buf(),
        };
        if !source.image_path.exists() {
            return Err(missing(ResourceKind::Image, &source.image_path));
        }
        if !source.descriptor_path.exists() {
            return Err(missing(ResourceKind::GroundTruth, &source.descriptor_path));
        }

        let image = ImageReader::open(&source.image_path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| ReportError::Decode {
                path: source.image_path.clone(),
                source: e,
            })?;

        let reader = BufReader::new(File::open(&source.descriptor_path)?);
        let ground_truth: GroundTruth =
            serde_json::from_reader(reader).map_err(|e| ReportError::Descriptor {
                path: source.descriptor_path.clone(),
                source: e,
            })?;

        Ok(Sample::from_record(record, image, ground_truth))
    }

    /// Loaded → Annotated: overlays and crops for both box families
    pub fn annotate(&self, sample: Sample) -> Result<AnnotatedSample> {
        let original = sample.image.to_rgb8();

        let gt_boxes = sample.gt_corner_boxes();
        let gt_overlay = self
            .annotator
            .annotate(&original, &gt_boxes, AnnotationStyle::GROUND_TRUTH);
        let gt_crops = annotation::crop(&original, &gt_boxes)?;

        let proposed_boxes = extract_proposed_boxes(&sample.transcript);
        let proposed_overlay = self
            .annotator
            .annotate(&original, &proposed_boxes, AnnotationStyle::PROPOSED);
        let proposed_crops = annotation::crop(&original, &proposed_boxes)?;

        debug!(
            sample = %sample.image_name,
            gt = gt_boxes.len(),
            proposed = proposed_boxes.len(),
            "annotated"
        );

        Ok(AnnotatedSample {
            sample,
            original,
            gt_boxes,
            gt_overlay,
            gt_crops,
            proposed_boxes,
            proposed_overlay,
            proposed_crops,
        })
    }

    /// Where the document for `image_name` goes
    pub fn document_path(&self, image_name: &str, outcome: Outcome) -> PathBuf {
        let partition = self.report_root.join(outcome.partition());
        let stem = file_stem(image_name);
        match self.output_mode {
            OutputMode::DocumentOnly => partition.join(format!("{stem}.pdf")),
            OutputMode::WithAssets => partition.join(stem).join("summary.pdf"),
        }
    }

    /// Annotated → Assembled → Written
    pub fn write(&self, annotated: &AnnotatedSample) -> Result<PathBuf> {
        let path = self.document_path(&annotated.sample.image_name, annotated.sample.outcome());
        let parent = path
            .parent()
            .ok_or_else(|| ReportError::assembly(&path, "document path has no parent"))?;
        std::fs::create_dir_all(parent).map_err(|e| ReportError::assembly(&path, e))?;

        let report = self.assembler.assemble(&annotated.report_inputs());
        debug!(
            sample = %annotated.sample.image_name,
            pages = report.page_count(),
            state = ?SampleState::Assembled,
            "report assembled"
        );

        write_atomically(&path, |out| report.write_pdf(out))
            .map_err(|e| ReportError::assembly(&path, e))?;

        if self.output_mode == OutputMode::WithAssets {
            // a sample that fails here leaves no document behind
            if let Err(err) = export_assets(parent, annotated) {
                let _ = std::fs::remove_file(&path);
                return Err(err);
            }
        }

        Ok(path)
    }
}

fn file_stem(image_name: &str) -> String {
    Path::new(image_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| image_name.to_string())
}

/// Write through a hidden temporary file in the same directory and rename it
/// into place. The temporary file is removed if anything fails.
fn write_atomically<F>(path: &Path, write: F) -> std::io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|s| s.to_str()).unwrap_or("report"),
        std::process::id()
    ));

    let result = File::create(&tmp).and_then(|file| {
        let mut out = BufWriter::new(file);
        write(&mut out)?;
        out.flush()?;
        out.get_ref().sync_all()
    });

    match result.and_then(|()| std::fs::rename(&tmp, path)) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = std::fs::remove_file(&tmp);
            Err(err)
        }
    }
}

/// Individual images and the text summary next to the document
fn export_assets(dir: &Path, annotated: &AnnotatedSample) -> Result<()> {
    let save = |image: &RgbImage, name: String| {
        let path = dir.join(name);
        image
            .save(&path)
            .map_err(|e| ReportError::assembly(&path, e))
    };

    save(&annotated.original, "original.jpg".to_string())?;
    save(&annotated.gt_overlay, "original_with_gt_boxes.jpg".to_string())?;
    save(&annotated.proposed_overlay, "original_with_zoom_boxes.jpg".to_string())?;
    for (i, crop) in annotated.gt_crops.iter().enumerate() {
        save(crop, format!("gt_crop_{}.jpg", i + 1))?;
    }
    for (i, crop) in annotated.proposed_crops.iter().enumerate() {
        save(crop, format!("zoom_crop_{}.jpg", i + 1))?;
    }

    let summary_path = dir.join("summary.txt");
    std::fs::write(&summary_path, text_summary(&annotated.sample))
        .map_err(|e| ReportError::assembly(&summary_path, e))?;

    debug!(sample = %annotated.sample.image_name, dir = %dir.display(), "assets exported");
    Ok(())
}

/// Plain-text rendition of the summary and transcript
pub fn text_summary(sample: &Sample) -> String {
    let mut text = format!(
        "Image: {}\nQuestion: {}\nGT Answer: {}\nPredicted Answer: {}\n{}\n\nConversation:\n",
        sample.image_name,
        sample.question,
        sample.answer,
        sample.pred_ans,
        sample.outcome().label()
    );
    for turn in &sample.transcript {
        if let Some(content) = turn.content.text() {
            text.push_str(&format!(
                "{}: {}\n\n",
                turn.role.label(),
                layout::hard_wrap(&content, TEXT_DUMP_COLUMNS)
            ));
        }
    }
    text
}
