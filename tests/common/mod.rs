mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from groundcheck for tests
pub use groundcheck::{
    BoundingBox, Content, ContentBlock, EvalRecord, Role, SampleOutcome, SampleProcessor,
    SampleSource, Turn,
};
