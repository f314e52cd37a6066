use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::BoundingBox;

/// Which per-sample input was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    GroundTruth,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Image => f.write_str("image"),
            ResourceKind::GroundTruth => f.write_str("ground-truth descriptor"),
        }
    }
}

/// Errors raised while turning one sample into a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("missing {kind} for {sample}: {}", path.display())]
    ResourceMissing {
        sample: String,
        kind: ResourceKind,
        path: PathBuf,
    },

    #[error("crop {index} {bbox} is outside the {width}x{height} image")]
    Extraction {
        index: usize,
        bbox: BoundingBox,
        width: u32,
        height: u32,
    },

    #[error("failed to assemble report {}: {reason}", path.display())]
    Assembly { path: PathBuf, reason: String },

    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid ground-truth descriptor {}: {source}", path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// Missing inputs skip the sample instead of failing it
    pub fn is_skip(&self) -> bool {
        matches!(self, ReportError::ResourceMissing { .. })
    }

    pub(crate) fn assembly(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        ReportError::Assembly {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
