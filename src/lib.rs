pub mod annotation;
pub mod batch;
pub mod config;
pub mod error;
pub mod extraction;
pub mod geometry;
pub mod models;
pub mod pipeline;
pub mod report;

pub use annotation::{AnnotationStyle, Annotator, LabelFont};
pub use batch::{BatchDriver, BatchTally, load_records};
pub use config::{BatchConfig, DatasetVariant};
pub use error::{ReportError, ResourceKind};
pub use extraction::extract_proposed_boxes;
pub use geometry::{BoundingBox, ExtentBox, overlap_ratio, to_corner_form};
pub use models::{Content, ContentBlock, EvalRecord, GroundTruth, Outcome, Role, Sample, Turn};
pub use pipeline::{OutputMode, SampleOutcome, SampleProcessor, SampleSource, SampleState};
pub use report::{Report, ReportAssembler, ReportInputs, TranscriptLayout};
