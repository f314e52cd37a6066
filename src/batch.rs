use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::annotation::{Annotator, LabelFont};
use crate::config::BatchConfig;
use crate::models::EvalRecord;
use crate::pipeline::{SampleOutcome, SampleProcessor, SampleSource};
use crate::report::ReportAssembler;

/// Point size of TrueType box labels
const LABEL_FONT_SIZE: f32 = 16.0;

/// Running counts for a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchTally {
    pub fn record(&mut self, outcome: &SampleOutcome) {
        self.processed += 1;
        match outcome {
            SampleOutcome::Written { .. } => self.succeeded += 1,
            SampleOutcome::Skipped(_) => self.skipped += 1,
            SampleOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Read a JSONL results file.
///
/// Records are keyed by image name: a repeated image keeps the position of
/// its first line and the contents of its last.
pub fn load_records(path: &Path) -> Result<Vec<EvalRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let mut records: Vec<EvalRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: EvalRecord = serde_json::from_str(&line)
            .with_context(|| format!("invalid record at {}:{}", path.display(), line_no + 1))?;

        match positions.get(&record.image).copied() {
            Some(index) => records[index] = record,
            None => {
                positions.insert(record.image.clone(), records.len());
                records.push(record);
            }
        }
    }

    Ok(records)
}

/// Runs every sample of a batch through one processor, one at a time
pub struct BatchDriver {
    config: BatchConfig,
    processor: SampleProcessor,
}

impl BatchDriver {
    pub fn new(config: BatchConfig) -> Result<Self> {
        let label_font = match &config.label_font {
            Some(path) => LabelFont::from_file(path, LABEL_FONT_SIZE)
                .with_context(|| format!("failed to load label font {}", path.display()))?,
            None => LabelFont::default(),
        };

        let processor = SampleProcessor::new(&config.report_dir)
            .with_output_mode(config.output_mode)
            .with_annotator(Annotator::new(label_font))
            .with_assembler(ReportAssembler::new(config.layout));

        Ok(Self { config, processor })
    }

    pub fn source(&self, image_name: &str) -> SampleSource {
        SampleSource::in_dir(&self.config.image_dir, image_name)
    }

    /// Process all records in order; per-sample problems never abort the run
    pub fn run(&self, records: Vec<EvalRecord>) -> BatchTally {
        let progress = if self.config.show_progress {
            let pb = ProgressBar::new(records.len() as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "Processing Images: {percent:>3}%|{bar:40}| {pos}/{len} [{elapsed_precise}<{eta_precise}, {per_sec}] {msg}",
            ) {
                pb.set_style(style);
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut tally = BatchTally::default();
        for record in records {
            let source = self.source(&record.image);
            let outcome = self.processor.process(record, &source);
            tally.record(&outcome);
            progress.set_message(format!("ok={} failed={}", tally.succeeded, tally.failed));
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!(
            processed = tally.processed,
            succeeded = tally.succeeded,
            failed = tally.failed,
            skipped = tally.skipped,
            "batch complete"
        );
        tally
    }
}
