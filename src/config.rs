use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::pipeline::OutputMode;
use crate::report::TranscriptLayout;

/// Benchmark split; selects a subdirectory of both the image and report roots
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatasetVariant {
    DirectAttributes,
    RelativePosition,
}

impl DatasetVariant {
    pub fn dir_name(&self) -> &'static str {
        match self {
            DatasetVariant::DirectAttributes => "direct_attributes",
            DatasetVariant::RelativePosition => "relative_position",
        }
    }

    /// Guess the split from the results file name
    pub fn infer(results_path: &Path) -> Self {
        let name = results_path.to_string_lossy();
        if name.contains("direct_attributes") {
            DatasetVariant::DirectAttributes
        } else {
            DatasetVariant::RelativePosition
        }
    }
}

/// Fully resolved settings for one batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// JSONL evaluation results
    pub results_path: PathBuf,
    /// Directory holding `<image>` and `<image stem>.json`
    pub image_dir: PathBuf,
    /// Directory receiving the `success/` and `fail/` partitions
    pub report_dir: PathBuf,
    pub output_mode: OutputMode,
    pub layout: TranscriptLayout,
    /// TrueType font for box labels; built-in digits when unset
    pub label_font: Option<PathBuf>,
    pub show_progress: bool,
}

impl BatchConfig {
    /// Resolve roots against the dataset variant, inferring it when not given
    pub fn new(
        results_path: PathBuf,
        image_root: &Path,
        report_root: &Path,
        variant: Option<DatasetVariant>,
    ) -> Self {
        let variant = variant.unwrap_or_else(|| DatasetVariant::infer(&results_path));
        Self {
            image_dir: image_root.join(variant.dir_name()),
            report_dir: report_root.join(variant.dir_name()),
            results_path,
            output_mode: OutputMode::default(),
            layout: TranscriptLayout::default(),
            label_font: None,
            show_progress: true,
        }
    }
}
